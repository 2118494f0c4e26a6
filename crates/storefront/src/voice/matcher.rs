//! Rule-based transcript classification.
//!
//! Rules are plain regular expressions over the normalized transcript, tried
//! in a fixed order. English and Indonesian phrasings sit side by side in the
//! same alternations.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Page, SortOrder, VoiceCommand};

/// Leading politeness fillers, longest first.
const LEADING_FILLERS: &[&str] = &["can you", "please", "tolong", "bisa", "coba"];

/// Trailing politeness fillers.
const TRAILING_FILLERS: &[&str] = &["please", "dong", "ya"];

/// Sentence punctuation stripped from the end of a transcript.
const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static NAVIGATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:go to|go|open|show me|show|take me to|navigate to|buka|ke|pergi ke|lihat|tampilkan)\s+(?:the\s+|my\s+|halaman\s+)?(?P<page>home|beranda|utama|menu|daftar menu|cart|shopping cart|keranjang belanja|keranjang|order history|orders|order|riwayat pesanan|pesanan|profile|profil|account|akun)(?:\s+page|\s+saya)?$",
    )
    .expect("Invalid regex")
});

static CLEAR_CART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:clear|empty|reset)\s+(?:the\s+|my\s+)?cart|(?:remove|delete)\s+everything(?:\s+from\s+(?:the\s+|my\s+)?cart)?|(?:kosongkan|bersihkan)\s+keranjang(?:\s+belanja)?(?:\s+saya)?|hapus\s+semua(?:\s+isi)?(?:\s+(?:keranjang|pesanan|item))?(?:\s+saya)?)$",
    )
    .expect("Invalid regex")
});

static CHECKOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:checkout|check out|proceed to checkout|go to checkout|place (?:the |my )?order|pay|pay now|bayar|bayar sekarang|lanjut(?:kan)?\s+(?:ke\s+)?(?:pembayaran|checkout)|pesan sekarang|selesaikan pesanan)$",
    )
    .expect("Invalid regex")
});

static SORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:sort|order|urutkan)(?:\s+(?:by|berdasarkan|dari))?\s+(?:the\s+|yang\s+)?(?P<key>cheapest|lowest price|price low to high|price ascending|harga termurah|harga terendah|termurah|paling murah|harga|price|most expensive|highest price|price high to low|harga termahal|harga tertinggi|termahal|paling mahal|name|nama|alphabetical|abjad|a to z|most popular|popularity|popular|best sellers?|terpopuler|populer|terlaris|paling laris)(?:\s+first|\s+dulu|\s+duluan)?$",
    )
    .expect("Invalid regex")
});

static SUPERLATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:show(?:\s+me)?|tampilkan|lihat)\s+)?(?:the\s+|yang\s+)?(?P<key>cheapest|most expensive|most popular|best sellers?|termurah|paling murah|termahal|paling mahal|terlaris|paling laris|terpopuler)(?:\s+(?:ones|juices?|jus|menu|first|dulu))?$",
    )
    .expect("Invalid regex")
});

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:filter|saring)(?:\s+(?:by|berdasarkan))?\s+(?:(?:category|kategori)\s+)?|(?:show(?:\s+me)?|tampilkan|lihat)\s+(?:only\s+|hanya\s+)?(?:the\s+)?(?:category|kategori)\s+)(?P<category>.+)$",
    )
    .expect("Invalid regex")
});

static FILTER_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:show(?:\s+me)?|tampilkan|lihat)\s+(?:only\s+|hanya\s+)?(?:the\s+)?(?P<category>.+?)\s+category$")
        .expect("Invalid regex")
});

static REMOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<verb>remove|delete|take out|reduce|decrease|hapus|buang|keluarkan|kurangi)\s+(?:(?P<qty>\d+|one|two|three|four|five|six|seven|eight|nine|ten|satu|dua|tiga|empat|lima|enam|tujuh|delapan|sembilan|sepuluh)\s+)?(?:(?:cups?|glass(?:es)?|gelas|cup|porsi|buah)\s+)?(?:the\s+|my\s+)?(?P<item>.+?)(?:\s+(?:from|dari)\s+(?:the\s+|my\s+)?(?:cart|keranjang)(?:\s+saya)?)?$",
    )
    .expect("Invalid regex")
});

static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:search for|search|find me|find|look for|carikan|cari|mencari|do you have|is there|apakah ada|ada)\s+(?P<query>.+?)(?:\s+(?:nggak|ga|gak|tidak|enggak))?$",
    )
    .expect("Invalid regex")
});

/// Normalize a raw transcript for matching.
///
/// Lowercases, strips trailing sentence punctuation, collapses runs of
/// whitespace and drops politeness fillers from both ends. Punctuation inside
/// the transcript is kept, so "1.5 liter" survives.
#[must_use]
pub fn normalize(transcript: &str) -> String {
    let lowered = transcript.to_lowercase();
    let trimmed = lowered.trim().trim_end_matches(TRAILING_PUNCTUATION);
    let mut text = WHITESPACE_RE.replace_all(trimmed.trim(), " ").into_owned();

    loop {
        let stripped = LEADING_FILLERS.iter().find_map(|filler| {
            text.strip_prefix(filler)
                .map(|rest| rest.strip_prefix(',').unwrap_or(rest))
                .and_then(|rest| rest.strip_prefix(' '))
                .map(str::to_string)
        });
        match stripped {
            Some(rest) if !rest.is_empty() => text = rest,
            _ => break,
        }
    }

    loop {
        let stripped = TRAILING_FILLERS.iter().find_map(|filler| {
            text.strip_suffix(filler)
                .and_then(|rest| rest.strip_suffix(' '))
                .map(|rest| rest.trim_end_matches(TRAILING_PUNCTUATION).trim_end())
                .map(str::to_string)
        });
        match stripped {
            Some(rest) if !rest.is_empty() => text = rest,
            _ => break,
        }
    }

    text
}

/// Classify a transcript into a local command.
///
/// Returns `None` when no rule matches, meaning the transcript should go to
/// the assistant.
#[must_use]
pub fn classify(transcript: &str) -> Option<VoiceCommand> {
    let text = normalize(transcript);
    if text.is_empty() {
        return None;
    }

    navigate(&text)
        .or_else(|| clear_cart(&text))
        .or_else(|| checkout(&text))
        .or_else(|| sort(&text))
        .or_else(|| filter(&text))
        .or_else(|| remove_from_cart(&text))
        .or_else(|| search(&text))
}

fn navigate(text: &str) -> Option<VoiceCommand> {
    let caps = NAVIGATE_RE.captures(text)?;
    let page = match &caps["page"] {
        "home" | "beranda" | "utama" => Page::Home,
        "menu" | "daftar menu" => Page::Menu,
        "cart" | "shopping cart" | "keranjang" | "keranjang belanja" => Page::Cart,
        "orders" | "order" | "order history" | "pesanan" | "riwayat pesanan" => Page::Orders,
        _ => Page::Profile,
    };
    Some(VoiceCommand::Navigate(page))
}

fn clear_cart(text: &str) -> Option<VoiceCommand> {
    CLEAR_CART_RE
        .is_match(text)
        .then_some(VoiceCommand::ClearCart)
}

fn checkout(text: &str) -> Option<VoiceCommand> {
    CHECKOUT_RE.is_match(text).then_some(VoiceCommand::Checkout)
}

fn sort(text: &str) -> Option<VoiceCommand> {
    let caps = SORT_RE
        .captures(text)
        .or_else(|| SUPERLATIVE_RE.captures(text))?;
    sort_order(&caps["key"]).map(VoiceCommand::Sort)
}

fn sort_order(key: &str) -> Option<SortOrder> {
    if key.contains("murah")
        || key.contains("terendah")
        || key.contains("cheap")
        || key.contains("lowest")
        || key.contains("low to high")
        || key.contains("ascending")
        || key == "harga"
        || key == "price"
    {
        Some(SortOrder::PriceAsc)
    } else if key.contains("mahal")
        || key.contains("tertinggi")
        || key.contains("expensive")
        || key.contains("highest")
        || key.contains("high to low")
    {
        Some(SortOrder::PriceDesc)
    } else if matches!(key, "name" | "nama" | "alphabetical" | "abjad" | "a to z") {
        Some(SortOrder::NameAsc)
    } else if key.contains("popul") || key.contains("laris") || key.contains("best seller") {
        Some(SortOrder::Popular)
    } else {
        None
    }
}

fn filter(text: &str) -> Option<VoiceCommand> {
    let caps = FILTER_SUFFIX_RE
        .captures(text)
        .or_else(|| FILTER_RE.captures(text))?;
    let category = cleaned(&caps, "category")?;
    Some(VoiceCommand::Filter { category })
}

fn remove_from_cart(text: &str) -> Option<VoiceCommand> {
    let caps = REMOVE_RE.captures(text)?;
    let item = cleaned(&caps, "item")?;
    let quantity = caps
        .name("qty")
        .and_then(|m| parse_quantity(m.as_str()))
        .or_else(|| {
            matches!(&caps["verb"], "reduce" | "decrease" | "kurangi").then_some(1)
        });
    Some(VoiceCommand::RemoveFromCart { item, quantity })
}

fn search(text: &str) -> Option<VoiceCommand> {
    let caps = SEARCH_RE.captures(text)?;
    let query = cleaned(&caps, "query")?;
    Some(VoiceCommand::Search { query })
}

/// A trimmed, non-empty capture group.
fn cleaned(caps: &Captures<'_>, name: &str) -> Option<String> {
    let value = caps.name(name)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Digits or a spoken number from one to ten.
fn parse_quantity(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return (n > 0).then_some(n);
    }
    let n = match word {
        "one" | "satu" => 1,
        "two" | "dua" => 2,
        "three" | "tiga" => 3,
        "four" | "empat" => 4,
        "five" | "lima" => 5,
        "six" | "enam" => 6,
        "seven" | "tujuh" => 7,
        "eight" | "delapan" => 8,
        "nine" | "sembilan" => 9,
        "ten" | "sepuluh" => 10,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fillers_and_punctuation() {
        assert_eq!(normalize("  Tolong, BUKA   menu dong! "), "buka menu");
        assert_eq!(normalize("Can you please open the cart?"), "open the cart");
        assert_eq!(normalize("coba cari jus mangga ya."), "cari jus mangga");
        assert_eq!(normalize("Please"), "please");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("open the menu, please."), "open the menu");
    }

    #[test]
    fn test_normalize_keeps_inner_punctuation() {
        assert_eq!(normalize("Cari jus 1.5 liter?!"), "cari jus 1.5 liter");
        assert_eq!(
            classify("cari jus 1.5 liter"),
            Some(VoiceCommand::Search {
                query: "jus 1.5 liter".to_string()
            })
        );
    }

    #[test]
    fn test_navigate() {
        assert_eq!(
            classify("Buka keranjang"),
            Some(VoiceCommand::Navigate(Page::Cart))
        );
        assert_eq!(
            classify("go to the menu page"),
            Some(VoiceCommand::Navigate(Page::Menu))
        );
        assert_eq!(
            classify("lihat pesanan saya"),
            Some(VoiceCommand::Navigate(Page::Orders))
        );
        assert_eq!(
            classify("show my order history"),
            Some(VoiceCommand::Navigate(Page::Orders))
        );
        assert_eq!(
            classify("ke halaman utama"),
            Some(VoiceCommand::Navigate(Page::Home))
        );
        assert_eq!(
            classify("open my account"),
            Some(VoiceCommand::Navigate(Page::Profile))
        );
    }

    #[test]
    fn test_clear_cart() {
        for phrase in [
            "clear cart",
            "Empty my cart",
            "kosongkan keranjang",
            "tolong bersihkan keranjang belanja saya",
            "hapus semua",
            "remove everything from the cart",
        ] {
            assert_eq!(classify(phrase), Some(VoiceCommand::ClearCart), "{phrase}");
        }
    }

    #[test]
    fn test_checkout() {
        for phrase in ["checkout", "Check out please", "bayar sekarang", "lanjut ke pembayaran"] {
            assert_eq!(classify(phrase), Some(VoiceCommand::Checkout), "{phrase}");
        }
    }

    #[test]
    fn test_sort() {
        assert_eq!(
            classify("sort by cheapest"),
            Some(VoiceCommand::Sort(SortOrder::PriceAsc))
        );
        assert_eq!(
            classify("urutkan dari yang termahal"),
            Some(VoiceCommand::Sort(SortOrder::PriceDesc))
        );
        assert_eq!(
            classify("sort by name"),
            Some(VoiceCommand::Sort(SortOrder::NameAsc))
        );
        assert_eq!(
            classify("yang paling laris"),
            Some(VoiceCommand::Sort(SortOrder::Popular))
        );
        assert_eq!(
            classify("show me the cheapest juices"),
            Some(VoiceCommand::Sort(SortOrder::PriceAsc))
        );
    }

    #[test]
    fn test_filter() {
        assert_eq!(
            classify("filter by category smoothie"),
            Some(VoiceCommand::Filter {
                category: "smoothie".to_string()
            })
        );
        assert_eq!(
            classify("tampilkan kategori jus buah"),
            Some(VoiceCommand::Filter {
                category: "jus buah".to_string()
            })
        );
        assert_eq!(
            classify("show me the detox category"),
            Some(VoiceCommand::Filter {
                category: "detox".to_string()
            })
        );
    }

    #[test]
    fn test_remove_from_cart() {
        assert_eq!(
            classify("hapus jus mangga dari keranjang"),
            Some(VoiceCommand::RemoveFromCart {
                item: "jus mangga".to_string(),
                quantity: None,
            })
        );
        assert_eq!(
            classify("remove two avocado juice from my cart"),
            Some(VoiceCommand::RemoveFromCart {
                item: "avocado juice".to_string(),
                quantity: Some(2),
            })
        );
        assert_eq!(
            classify("kurangi jus jeruk"),
            Some(VoiceCommand::RemoveFromCart {
                item: "jus jeruk".to_string(),
                quantity: Some(1),
            })
        );
        assert_eq!(
            classify("buang 3 gelas jus alpukat"),
            Some(VoiceCommand::RemoveFromCart {
                item: "jus alpukat".to_string(),
                quantity: Some(3),
            })
        );
    }

    #[test]
    fn test_search() {
        assert_eq!(
            classify("cari jus mangga"),
            Some(VoiceCommand::Search {
                query: "jus mangga".to_string()
            })
        );
        assert_eq!(
            classify("do you have watermelon juice?"),
            Some(VoiceCommand::Search {
                query: "watermelon juice".to_string()
            })
        );
        assert_eq!(
            classify("ada jus naga nggak"),
            Some(VoiceCommand::Search {
                query: "jus naga".to_string()
            })
        );
    }

    #[test]
    fn test_rule_order() {
        // "hapus semua" is a clear, not a removal of an item called "semua".
        assert_eq!(classify("hapus semua"), Some(VoiceCommand::ClearCart));
        // A navigation verb with a page wins over search-like phrasing.
        assert_eq!(
            classify("lihat menu"),
            Some(VoiceCommand::Navigate(Page::Menu))
        );
        // Category filters are matched before free-text search.
        assert!(matches!(
            classify("filter detox"),
            Some(VoiceCommand::Filter { .. })
        ));
    }

    #[test]
    fn test_unmatched_goes_to_assistant() {
        assert_eq!(classify("pesan dua jus mangga besar"), None);
        assert_eq!(classify("add an orange juice"), None);
        assert_eq!(classify("what's good today"), None);
        assert_eq!(classify("  ...  "), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("4"), Some(4));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("lima"), Some(5));
        assert_eq!(parse_quantity("many"), None);
    }
}
