//! Layout of the target site: URLs, platform codes and markup rules.
//!
//! Everything that depends on the upstream markup lives here so a redesign
//! only touches these tables.

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "http://www.3djuegos.com/";

/// Platform slug used when none (or an unknown one) is given.
pub const ALL_PLATFORMS: &str = "all";

/// Closed platform slug → numeric site ID table.
pub const PLATFORMS: &[(&str, u32)] = &[
    ("pc", 1),
    ("ps4", 37),
    ("xbox-one", 38),
    ("nintendo-switch", 41),
    ("3ds", 34),
    ("ps3", 2),
    ("x360", 4),
    ("wiiu", 35),
    ("wii", 3),
    ("psvita", 36),
    ("psp", 6),
    ("ios", 9),
    ("android", 32),
];

/// A platform resolved against [`PLATFORMS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub slug: &'static str,
    pub id: u32,
}

impl Platform {
    pub const ALL: Platform = Platform {
        slug: ALL_PLATFORMS,
        id: 0,
    };

    /// Look up a platform slug, case-insensitively. Unknown slugs map to
    /// [`Platform::ALL`] (ID 0).
    pub fn lookup(name: &str) -> Self {
        let wanted = name.trim().to_lowercase();
        PLATFORMS
            .iter()
            .find(|(slug, _)| *slug == wanted)
            .map(|&(slug, id)| Platform { slug, id })
            .unwrap_or(Self::ALL)
    }

    pub fn is_all(&self) -> bool {
        self.id == 0
    }
}

/// URL builders rooted at a configurable base.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SiteUrls {
    pub fn new(base: &str) -> Self {
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// Client-rendered search results page for a free-text query.
    pub fn search(&self, query: &str) -> String {
        format!(
            "{}?q={}&zona=resultados-buscador&ni=1",
            self.base,
            urlencoding::encode(query)
        )
    }

    /// Latest reviews listing, newest first.
    pub fn latest_reviews(&self, platform: Platform) -> String {
        if platform.is_all() {
            format!("{}novedades/analisis/juegos/0f0f0f0/fecha/", self.base)
        } else {
            format!(
                "{}novedades/analisis/juegos-{}/0f{}f0f0/fecha/",
                self.base, platform.slug, platform.id
            )
        }
    }

    /// Monthly release calendar.
    pub fn releases(&self, platform: Platform, year: i32, month: u32) -> String {
        if platform.is_all() {
            format!(
                "{}lanzamientos-juegos/todos/por-mes/0/{}/{}/",
                self.base, year, month
            )
        } else {
            format!(
                "{}lanzamientos-juegos/{}/por-mes/{}/{}/{}/",
                self.base, platform.slug, platform.id, year, month
            )
        }
    }

    /// Resolve a possibly relative href against the site root.
    pub fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        match url::Url::parse(&self.base).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base, href.trim_start_matches('/')),
        }
    }
}

/// Review page field which is copied from a labelled term/definition pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    Studio,
    Publisher,
    Genre,
}

/// Selector table for a single review page.
#[derive(Debug, Clone, Copy)]
pub struct ReviewMarkup {
    /// Bold title block; its first `name` child holds the game name and its
    /// full text carries the "(Platform)" suffix.
    pub title: &'static str,
    pub title_name: &'static str,
    pub term: &'static str,
    pub definition: &'static str,
    /// Exact term labels, as published by the site (accents included).
    pub labels: &'static [(&'static str, LabelField)],
    pub release_date: &'static str,
    pub release_date_attr: &'static str,
    /// Score widgets in document order: critic first, users second.
    pub score: &'static str,
    pub score_value: &'static str,
}

pub const REVIEW_MARKUP: ReviewMarkup = ReviewMarkup {
    title: "div.fftit.s20.b",
    title_name: "span",
    term: "dt",
    definition: "dd",
    labels: &[
        ("Desarrollador:", LabelField::Studio),
        ("Editor:", LabelField::Publisher),
        ("Género:", LabelField::Genre),
    ],
    release_date: r#"[itemprop="releaseDate"]"#,
    release_date_attr: "content",
    score: "div.dtc.wi36",
    score_value: "span",
};

/// Selector table for the listing pages.
#[derive(Debug, Clone, Copy)]
pub struct ListingMarkup {
    pub news_item: &'static str,
    pub news_title: &'static str,
    pub calendar: &'static str,
    /// Exact class set of a day header inside the calendar.
    pub date_header_classes: &'static [&'static str],
    /// Exact class set of a game row inside the calendar.
    pub entry_classes: &'static [&'static str],
    /// Search result links rendered by the browser.
    pub search_result_link: &'static str,
}

pub const LISTING_MARKUP: ListingMarkup = ListingMarkup {
    news_item: "div.nov_int_txt.wi100",
    news_title: "h2 a",
    calendar: "div.pad_rl10",
    date_header_classes: &["s20", "ffnav", "b", "mar_t50"],
    entry_classes: &["dtc", "vam"],
    search_result_link: "a.xXx.b",
};
