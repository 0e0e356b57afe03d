//! Static lookup tables shared by the extractors
//!
//! Loaded once on first use and never mutated.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::models::ServiceCategory;

/// Currency symbols, longest first so "US$" wins over "$"
pub(crate) const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("CA$", "CAD"),
    ("AU$", "AUD"),
    ("NZ$", "NZD"),
    ("HK$", "HKD"),
    ("Rs.", "INR"),
    ("R$", "BRL"),
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("S$", "SGD"),
    ("Rs", "INR"),
    ("zł", "PLN"),
    ("$", "USD"),
    ("£", "GBP"),
    ("€", "EUR"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₩", "KRW"),
    ("₽", "RUB"),
    ("₺", "TRY"),
    ("₴", "UAH"),
    ("₱", "PHP"),
    ("₦", "NGN"),
    ("₫", "VND"),
    ("฿", "THB"),
    ("₪", "ILS"),
];

/// Currency codes accepted next to an amount
pub(crate) static CURRENCY_CODES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "USD", "EUR", "GBP", "JPY", "INR", "KRW", "RUB", "TRY", "UAH", "PHP", "NGN", "VND",
        "THB", "ILS", "BRL", "AUD", "CAD", "NZD", "HKD", "SGD", "CHF", "CNY", "SEK", "NOK",
        "DKK", "PLN", "CZK", "HUF", "MXN", "ZAR", "AED", "SAR", "IDR", "MYR", "PKR", "BDT",
        "EGP", "KES", "ARS", "CLP", "COP", "TWD",
    ]
    .into_iter()
    .collect()
});

/// Currency names (singular and plural) to codes, matched case-insensitively
pub(crate) const CURRENCY_NAMES: &[(&str, &str)] = &[
    ("dollars", "USD"),
    ("dollar", "USD"),
    ("bucks", "USD"),
    ("euros", "EUR"),
    ("euro", "EUR"),
    ("pounds", "GBP"),
    ("pound", "GBP"),
    ("quid", "GBP"),
    ("yen", "JPY"),
    ("rupees", "INR"),
    ("rupee", "INR"),
    ("won", "KRW"),
    ("roubles", "RUB"),
    ("rubles", "RUB"),
    ("rouble", "RUB"),
    ("ruble", "RUB"),
    ("yuan", "CNY"),
    ("renminbi", "CNY"),
    ("francs", "CHF"),
    ("franc", "CHF"),
    ("reais", "BRL"),
    ("real", "BRL"),
    ("pesos", "MXN"),
    ("peso", "MXN"),
    ("lira", "TRY"),
    ("rand", "ZAR"),
    ("kronor", "SEK"),
    ("krona", "SEK"),
    ("kroner", "NOK"),
    ("krone", "NOK"),
    ("zloty", "PLN"),
    ("ringgit", "MYR"),
    ("dirhams", "AED"),
    ("dirham", "AED"),
];

pub(crate) static CURRENCY_NAME_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CURRENCY_NAMES.iter().copied().collect());

/// A service the extractor knows by name
#[derive(Debug)]
pub(crate) struct KnownService {
    /// Canonical display name
    pub name: &'static str,
    pub category: ServiceCategory,
    /// Variants that resolve to `name` (matched case-insensitively, whole words)
    pub aliases: &'static [&'static str],
    /// Registrable-domain labels and SMS sender IDs (lowercase)
    pub sender_keys: &'static [&'static str],
}

pub(crate) const KNOWN_SERVICES: &[KnownService] = &[
    KnownService {
        name: "Netflix",
        category: ServiceCategory::Streaming,
        aliases: &["NFLX"],
        sender_keys: &["netflix", "nflx", "netflx"],
    },
    KnownService {
        name: "Spotify",
        category: ServiceCategory::Music,
        aliases: &["Spotify Premium"],
        sender_keys: &["spotify", "spotfy"],
    },
    KnownService {
        name: "Hulu",
        category: ServiceCategory::Streaming,
        aliases: &[],
        sender_keys: &["hulu", "hulumail"],
    },
    KnownService {
        name: "Disney+",
        category: ServiceCategory::Streaming,
        aliases: &["Disney Plus", "DisneyPlus", "Disney+ Hotstar", "Hotstar"],
        sender_keys: &["disneyplus", "disney", "hotstar"],
    },
    KnownService {
        name: "Amazon Prime",
        category: ServiceCategory::Streaming,
        aliases: &["Prime Video", "Prime Membership", "Prime"],
        sender_keys: &["amazon", "primevideo", "amazonprime", "amzn"],
    },
    KnownService {
        name: "YouTube Premium",
        category: ServiceCategory::Streaming,
        aliases: &["YT Premium", "YouTube Red", "YouTube"],
        sender_keys: &["youtube"],
    },
    KnownService {
        name: "YouTube Music",
        category: ServiceCategory::Music,
        aliases: &["YT Music"],
        sender_keys: &[],
    },
    KnownService {
        name: "Apple Music",
        category: ServiceCategory::Music,
        aliases: &[],
        sender_keys: &[],
    },
    KnownService {
        name: "Apple TV+",
        category: ServiceCategory::Streaming,
        aliases: &["Apple TV Plus", "Apple TV"],
        sender_keys: &[],
    },
    KnownService {
        name: "iCloud+",
        category: ServiceCategory::CloudStorage,
        aliases: &["iCloud", "iCloud Storage"],
        sender_keys: &["icloud"],
    },
    KnownService {
        name: "HBO Max",
        category: ServiceCategory::Streaming,
        aliases: &["HBO"],
        sender_keys: &["hbomax", "hbo"],
    },
    KnownService {
        name: "Paramount+",
        category: ServiceCategory::Streaming,
        aliases: &["Paramount Plus", "ParamountPlus"],
        sender_keys: &["paramountplus", "paramount"],
    },
    KnownService {
        name: "Peacock",
        category: ServiceCategory::Streaming,
        aliases: &["Peacock Premium"],
        sender_keys: &["peacocktv", "peacock"],
    },
    KnownService {
        name: "Crunchyroll",
        category: ServiceCategory::Streaming,
        aliases: &[],
        sender_keys: &["crunchyroll"],
    },
    KnownService {
        name: "Audible",
        category: ServiceCategory::Education,
        aliases: &[],
        sender_keys: &["audible"],
    },
    KnownService {
        name: "Kindle Unlimited",
        category: ServiceCategory::Education,
        aliases: &[],
        sender_keys: &[],
    },
    KnownService {
        name: "Tidal",
        category: ServiceCategory::Music,
        aliases: &[],
        sender_keys: &["tidal"],
    },
    KnownService {
        name: "Deezer",
        category: ServiceCategory::Music,
        aliases: &[],
        sender_keys: &["deezer"],
    },
    KnownService {
        name: "Pandora",
        category: ServiceCategory::Music,
        aliases: &["Pandora Plus"],
        sender_keys: &["pandora"],
    },
    KnownService {
        name: "SiriusXM",
        category: ServiceCategory::Music,
        aliases: &["Sirius XM", "Sirius"],
        sender_keys: &["siriusxm", "sirius"],
    },
    KnownService {
        name: "Microsoft 365",
        category: ServiceCategory::Software,
        aliases: &["Office 365", "M365", "Microsoft Office"],
        sender_keys: &["microsoft", "office"],
    },
    KnownService {
        name: "Adobe Creative Cloud",
        category: ServiceCategory::Software,
        aliases: &["Creative Cloud", "Adobe CC", "Adobe"],
        sender_keys: &["adobe", "adobesystems"],
    },
    KnownService {
        name: "Dropbox",
        category: ServiceCategory::CloudStorage,
        aliases: &["Dropbox Plus"],
        sender_keys: &["dropbox", "dropboxmail"],
    },
    KnownService {
        name: "Google One",
        category: ServiceCategory::CloudStorage,
        aliases: &["Google Storage", "Google Drive Storage"],
        sender_keys: &["google"],
    },
    KnownService {
        name: "ChatGPT Plus",
        category: ServiceCategory::Software,
        aliases: &["ChatGPT", "OpenAI"],
        sender_keys: &["openai", "chatgpt"],
    },
    KnownService {
        name: "GitHub",
        category: ServiceCategory::Software,
        aliases: &["GitHub Copilot", "Copilot"],
        sender_keys: &["github"],
    },
    KnownService {
        name: "Notion",
        category: ServiceCategory::Software,
        aliases: &[],
        sender_keys: &["notion", "makenotion"],
    },
    KnownService {
        name: "Slack",
        category: ServiceCategory::Software,
        aliases: &[],
        sender_keys: &["slack", "slackhq"],
    },
    KnownService {
        name: "Zoom",
        category: ServiceCategory::Software,
        aliases: &["Zoom Pro"],
        sender_keys: &["zoom"],
    },
    KnownService {
        name: "Canva",
        category: ServiceCategory::Software,
        aliases: &["Canva Pro"],
        sender_keys: &["canva"],
    },
    KnownService {
        name: "Grammarly",
        category: ServiceCategory::Software,
        aliases: &["Grammarly Premium"],
        sender_keys: &["grammarly"],
    },
    KnownService {
        name: "1Password",
        category: ServiceCategory::Software,
        aliases: &[],
        sender_keys: &["1password", "agilebits"],
    },
    KnownService {
        name: "NordVPN",
        category: ServiceCategory::Software,
        aliases: &["Nord VPN"],
        sender_keys: &["nordvpn", "nordaccount"],
    },
    KnownService {
        name: "ExpressVPN",
        category: ServiceCategory::Software,
        aliases: &["Express VPN"],
        sender_keys: &["expressvpn"],
    },
    KnownService {
        name: "Xbox Game Pass",
        category: ServiceCategory::Gaming,
        aliases: &["Game Pass", "Xbox Live"],
        sender_keys: &["xbox"],
    },
    KnownService {
        name: "PlayStation Plus",
        category: ServiceCategory::Gaming,
        aliases: &["PS Plus", "PSN Plus"],
        sender_keys: &["playstation", "sony"],
    },
    KnownService {
        name: "Nintendo Switch Online",
        category: ServiceCategory::Gaming,
        aliases: &["Nintendo Online"],
        sender_keys: &["nintendo"],
    },
    KnownService {
        name: "Twitch",
        category: ServiceCategory::Gaming,
        aliases: &["Twitch Turbo"],
        sender_keys: &["twitch"],
    },
    KnownService {
        name: "The New York Times",
        category: ServiceCategory::News,
        aliases: &["New York Times", "NYTimes", "NYT"],
        sender_keys: &["nytimes"],
    },
    KnownService {
        name: "The Wall Street Journal",
        category: ServiceCategory::News,
        aliases: &["Wall Street Journal", "WSJ"],
        sender_keys: &["wsj", "dowjones"],
    },
    KnownService {
        name: "Medium",
        category: ServiceCategory::News,
        aliases: &[],
        sender_keys: &["medium"],
    },
    KnownService {
        name: "Peloton",
        category: ServiceCategory::Fitness,
        aliases: &["Peloton App"],
        sender_keys: &["onepeloton", "peloton"],
    },
    KnownService {
        name: "Strava",
        category: ServiceCategory::Fitness,
        aliases: &["Strava Summit"],
        sender_keys: &["strava"],
    },
    KnownService {
        name: "Headspace",
        category: ServiceCategory::Fitness,
        aliases: &[],
        sender_keys: &["headspace"],
    },
    KnownService {
        name: "Calm",
        category: ServiceCategory::Fitness,
        aliases: &[],
        sender_keys: &["calm"],
    },
    KnownService {
        name: "Duolingo",
        category: ServiceCategory::Education,
        aliases: &["Duolingo Plus", "Super Duolingo"],
        sender_keys: &["duolingo"],
    },
    KnownService {
        name: "Coursera",
        category: ServiceCategory::Education,
        aliases: &["Coursera Plus"],
        sender_keys: &["coursera"],
    },
    KnownService {
        name: "LinkedIn Premium",
        category: ServiceCategory::Social,
        aliases: &["LinkedIn"],
        sender_keys: &["linkedin"],
    },
    KnownService {
        name: "Tinder",
        category: ServiceCategory::Social,
        aliases: &["Tinder Gold", "Tinder Plus"],
        sender_keys: &["tinder", "gotinder"],
    },
    KnownService {
        name: "Bumble",
        category: ServiceCategory::Social,
        aliases: &["Bumble Premium"],
        sender_keys: &["bumble"],
    },
    KnownService {
        name: "Patreon",
        category: ServiceCategory::Social,
        aliases: &[],
        sender_keys: &["patreon"],
    },
    KnownService {
        name: "Uber One",
        category: ServiceCategory::Delivery,
        aliases: &[],
        sender_keys: &["uber"],
    },
    KnownService {
        name: "DoorDash DashPass",
        category: ServiceCategory::Delivery,
        aliases: &["DashPass", "DoorDash"],
        sender_keys: &["doordash"],
    },
    KnownService {
        name: "Instacart+",
        category: ServiceCategory::Delivery,
        aliases: &["Instacart Plus", "Instacart"],
        sender_keys: &["instacart"],
    },
];

/// Every lowercase sender key mapped to its service
pub(crate) static SERVICE_BY_SENDER_KEY: Lazy<HashMap<&'static str, &'static KnownService>> =
    Lazy::new(|| {
        let mut map = HashMap::new();
        for service in KNOWN_SERVICES {
            for key in service.sender_keys {
                map.entry(*key).or_insert(service);
            }
        }
        map
    });

/// Canonical names and aliases, lowercased, longest first
///
/// Longer terms must be tried first so "Amazon Prime" beats "Prime" and
/// "YouTube Music" beats "YouTube".
pub(crate) static SERVICE_TERMS: Lazy<Vec<ServiceTerm>> = Lazy::new(|| {
    let mut terms = Vec::new();
    for service in KNOWN_SERVICES {
        terms.push(ServiceTerm {
            term: service.name.to_lowercase(),
            service,
            is_alias: false,
        });
        for alias in service.aliases {
            terms.push(ServiceTerm {
                term: alias.to_lowercase(),
                service,
                is_alias: true,
            });
        }
    }
    terms.sort_by(|a, b| b.term.len().cmp(&a.term.len()));
    terms
});

pub(crate) struct ServiceTerm {
    pub term: String,
    pub service: &'static KnownService,
    pub is_alias: bool,
}

/// Two-label public suffixes; the registrable domain sits one label above these
pub(crate) static MULTI_LABEL_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "co.uk", "org.uk", "me.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.nz",
        "co.in", "net.in", "org.in", "co.jp", "ne.jp", "co.kr", "com.br", "com.mx", "com.ar",
        "com.tr", "com.sg", "com.my", "com.ph", "com.cn", "com.hk", "com.tw", "co.za", "co.id",
        "com.ng", "com.eg", "com.sa", "co.il",
    ]
    .into_iter()
    .collect()
});

/// Local parts and sender-ID fragments that carry no service identity
pub(crate) const SENDER_NOISE: &[&str] = &[
    "noreply",
    "no-reply",
    "no_reply",
    "donotreply",
    "do-not-reply",
    "billing",
    "payments",
    "payment",
    "invoice",
    "invoices",
    "receipts",
    "receipt",
    "account",
    "accounts",
    "alerts",
    "alert",
    "info",
    "notify",
    "notifications",
    "notification",
    "support",
    "mail",
    "email",
    "news",
    "team",
    "hello",
    "service",
    "services",
    "subscriptions",
    "subscription",
    "members",
    "member",
    "www",
];

/// Service terms that are also ordinary words; these only match when capitalized
pub(crate) const COMMON_WORD_TERMS: &[&str] = &[
    "prime", "calm", "medium", "zoom", "slack", "notion", "tidal", "peacock", "sirius",
    "copilot", "hotstar",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_keys_unique_enough() {
        assert_eq!(SERVICE_BY_SENDER_KEY.get("netflix").unwrap().name, "Netflix");
        assert_eq!(SERVICE_BY_SENDER_KEY.get("disneyplus").unwrap().name, "Disney+");
    }

    #[test]
    fn test_service_terms_longest_first() {
        let terms: Vec<&str> = SERVICE_TERMS.iter().map(|t| t.term.as_str()).collect();
        let amazon = terms.iter().position(|t| *t == "amazon prime").unwrap();
        let prime = terms.iter().position(|t| *t == "prime").unwrap();
        assert!(amazon < prime);
    }

    #[test]
    fn test_currency_tables() {
        assert!(CURRENCY_CODES.contains("EUR"));
        assert!(!CURRENCY_CODES.contains("DAY"));
        assert_eq!(CURRENCY_NAME_MAP.get("euros"), Some(&"EUR"));
    }
}
