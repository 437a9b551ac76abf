//! Keyword tables for the classifier and the relevance filter.
//!
//! Kept as ordered data so precedence stays auditable. Classifier groups are
//! matched by substring against space-padded text; filter keywords are matched
//! with word boundaries when they are a single word.

use crate::models::Category;

/// Ordered category groups; the first group with a hit decides the category.
pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
    // utility alerts
    (
        Category::Alerts,
        &[
            "power cut",
            "power outage",
            "power shutdown",
            "power supply will",
            "power interruption",
            "load shedding",
            "electricity supply",
            "blackout",
            "water cut",
            "water outage",
            "no water supply",
        ],
    ),
    // traffic and water-supply alerts
    (
        Category::Alerts,
        &[
            "traffic diversion",
            "traffic advisory",
            "traffic restrictions",
            "diversions",
            "road closed",
            "road closure",
            "roads closed",
            "metro services",
            "train services",
            "trains cancelled",
            "water supply",
        ],
    ),
    (
        Category::WeatherAlerts,
        &[
            "heavy rain",
            "rain alert",
            "orange alert",
            "red alert",
            "yellow alert",
            "cyclone",
            "heatwave",
            "heat wave",
            "thunderstorm",
            "weather warning",
            "weather alert",
            "flood warning",
            "storm warning",
            "met department",
        ],
    ),
    (
        Category::Movies,
        &[
            "movie",
            "film",
            "cinema",
            "box office",
            "trailer",
            "ott release",
            " on ott",
            "ott platform",
            "netflix",
            "prime video",
            "hotstar",
            "jiocinema",
            "sonyliv",
            "zee5",
            "streaming",
            "theatrical release",
        ],
    ),
    (
        Category::Sports,
        &[
            " match",
            " vs ",
            " vs. ",
            " ipl",
            "cricket",
            "football",
            "tournament",
            "marathon",
            "stadium",
            "kabaddi",
            " league",
            " t20",
            " odi ",
            "hockey",
            "badminton",
            "tennis",
            "isl ",
        ],
    ),
    (
        Category::Festivals,
        &[
            "festival",
            "diwali",
            "deepavali",
            "pongal",
            "navratri",
            "dussehra",
            "christmas",
            " eid",
            " holi ",
            "durga puja",
            "ganesh chaturthi",
            "onam",
            "new year",
            "sankranti",
            "utsav",
        ],
    ),
    (
        Category::Shopping,
        &[
            " sale",
            "discount",
            " offer",
            " deals",
            "shopping",
            "flea market",
            "clearance",
            "% off",
            "buy one get one",
        ],
    ),
    (
        Category::Civic,
        &[
            "bandh",
            "strike",
            "protest",
            "hartal",
            "election",
            "polling",
            " rally",
            "agitation",
            "curfew",
            "section 144",
            "prohibitory orders",
        ],
    ),
    (
        Category::Events,
        &[
            "concert",
            " event",
            " show",
            "exhibition",
            "workshop",
            "meetup",
            "stand-up",
            "standup",
            "comedy",
            "performance",
            "theatre",
            " gig",
            " fair",
            "carnival",
            "music",
            "expo",
            "tickets",
        ],
    ),
    // generic alert fallback
    (
        Category::Alerts,
        &[
            " alert",
            "advisory",
            "warning",
            "suspended",
            "disruption",
            "shut for",
            "closed for",
        ],
    ),
];

/// Negative vocabulary, grouped by the kind of noise it catches.
pub const NEGATIVE_GROUPS: &[(&str, &[&str])] = &[
    (
        "commentary",
        &[
            "review",
            "reviews",
            "reviewed",
            "opinion",
            "analysis",
            "explained",
            "explainer",
            "reaction",
            "reacts",
            "verdict",
        ],
    ),
    (
        "gossip",
        &[
            "gossip",
            "rumour",
            "rumours",
            "rumor",
            "rumors",
            "dating",
            "spotted",
            "breakup",
            "affair",
            "wardrobe malfunction",
            "viral video",
        ],
    ),
    (
        "crime",
        &[
            "arrested",
            "murder",
            "murdered",
            "robbery",
            "theft",
            "assault",
            "accused",
            "fir",
            "custody",
            "police case",
            "chargesheet",
        ],
    ),
    (
        "finance",
        &[
            "shares",
            "stock price",
            "quarterly results",
            "q1 results",
            "q2 results",
            "q3 results",
            "q4 results",
            "net profit",
            "revenue",
            "ipo",
            "sensex",
            "nifty",
        ],
    ),
    (
        "politics",
        &[
            "slams",
            "hits out",
            "jibe",
            "takes a dig",
            "war of words",
            "blames",
            "lashes out",
        ],
    ),
    (
        "past_tense",
        &[
            "was held",
            "were held",
            "concluded",
            "wrapped up",
            "took place",
            "last week",
            "last month",
            "yesterday",
            "earlier this week",
            "came to an end",
            "was celebrated",
        ],
    ),
    (
        "obituary",
        &[
            "passes away",
            "passed away",
            "dies",
            "died",
            "demise",
            "obituary",
            "rip",
            "condolences",
            "last rites",
        ],
    ),
    (
        "listicle",
        &[
            "things to know",
            "top 10",
            "best of",
            "you need to know",
            "ranked",
            "ranking",
        ],
    ),
    (
        "box_office",
        &[
            "box office collection",
            "box office day",
            "collection day",
            "worldwide collection",
            "crore on day",
            "opening weekend collection",
        ],
    ),
    (
        "clickbait",
        &[
            "you won't believe",
            "shocking",
            "here's why",
            "what happened next",
            "jaw-dropping",
            "goes viral",
        ],
    ),
];

/// Scheduling, booking and venue vocabulary. Every entry that matches adds one point.
pub const FORWARD_SIGNALS: &[&str] = &[
    "upcoming",
    "scheduled",
    "will be held",
    "will take place",
    "to be held",
    "tickets",
    "book now",
    "bookings open",
    "booking",
    "registration",
    "register",
    "venue",
    "starts",
    "begins",
    "tomorrow",
    "tonight",
    "this weekend",
    "next week",
    "coming soon",
    "set to",
    "to release",
    "releasing",
    "releases on",
    "premieres",
    "premiere",
    "opens",
    "kick off",
    "line-up",
    "lineup",
    "schedule",
    "timings",
    "entry free",
    "free entry",
    "passes",
    "save the date",
    "gates open",
    "from today",
];

/// Category positive keywords for the planner categories.
pub const POSITIVE_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Movies,
        &[
            "release",
            "releases",
            "releasing",
            "premiere",
            "premieres",
            "theatres",
            "in cinemas",
            "ott",
            "streaming",
            "screening",
            "trailer",
        ],
    ),
    (
        Category::Events,
        &[
            "concert",
            "tickets",
            "registration",
            "workshop",
            "exhibition",
            "venue",
            "show",
            "performance",
            "fair",
            "meetup",
            "festival",
            "play",
        ],
    ),
    (
        Category::Sports,
        &[
            "match",
            "vs",
            "fixture",
            "fixtures",
            "tickets",
            "kick-off",
            "tournament",
            "final",
            "semifinal",
            "qualifier",
        ],
    ),
    (
        Category::Shopping,
        &[
            "sale",
            "discount",
            "discounts",
            "offer",
            "offers",
            "deals",
            "expo",
            "clearance",
            "% off",
        ],
    ),
];

/// Streaming and release platforms recognised in roundup bodies, paired with display names.
pub const PLATFORMS: &[(&str, &str)] = &[
    ("netflix", "Netflix"),
    ("prime video", "Prime Video"),
    ("amazon prime", "Prime Video"),
    ("disney+ hotstar", "Disney+ Hotstar"),
    ("hotstar", "Disney+ Hotstar"),
    ("jiocinema", "JioCinema"),
    ("jiohotstar", "JioHotstar"),
    ("sonyliv", "SonyLIV"),
    ("zee5", "ZEE5"),
    ("apple tv+", "Apple TV+"),
    ("aha", "aha"),
    ("theatres", "Theatres"),
    ("theaters", "Theatres"),
    ("cinemas", "Theatres"),
];

/// Built-in positives for `category`, empty for non-planner categories.
pub fn positive_keywords(category: Category) -> &'static [&'static str] {
    POSITIVE_KEYWORDS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}
