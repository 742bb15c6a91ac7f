//! The 77 provinces of Thailand.
//!
//! Names follow the Royal Thai General System romanisation used by the
//! Department of Provincial Administration. Lookups ignore case, spaces and
//! hyphens so `"chiangmai"`, `"Chiang-Mai"` and `"CHIANG MAI"` all resolve to
//! `"Chiang Mai"`.

/// Canonical English province names, Bangkok first, then alphabetical.
pub const PROVINCES: [&str; 77] = [
    "Bangkok",
    "Amnat Charoen",
    "Ang Thong",
    "Bueng Kan",
    "Buriram",
    "Chachoengsao",
    "Chai Nat",
    "Chaiyaphum",
    "Chanthaburi",
    "Chiang Mai",
    "Chiang Rai",
    "Chonburi",
    "Chumphon",
    "Kalasin",
    "Kamphaeng Phet",
    "Kanchanaburi",
    "Khon Kaen",
    "Krabi",
    "Lampang",
    "Lamphun",
    "Loei",
    "Lopburi",
    "Mae Hong Son",
    "Maha Sarakham",
    "Mukdahan",
    "Nakhon Nayok",
    "Nakhon Pathom",
    "Nakhon Phanom",
    "Nakhon Ratchasima",
    "Nakhon Sawan",
    "Nakhon Si Thammarat",
    "Nan",
    "Narathiwat",
    "Nong Bua Lamphu",
    "Nong Khai",
    "Nonthaburi",
    "Pathum Thani",
    "Pattani",
    "Phang Nga",
    "Phatthalung",
    "Phayao",
    "Phetchabun",
    "Phetchaburi",
    "Phichit",
    "Phitsanulok",
    "Phra Nakhon Si Ayutthaya",
    "Phrae",
    "Phuket",
    "Prachinburi",
    "Prachuap Khiri Khan",
    "Ranong",
    "Ratchaburi",
    "Rayong",
    "Roi Et",
    "Sa Kaeo",
    "Sakon Nakhon",
    "Samut Prakan",
    "Samut Sakhon",
    "Samut Songkhram",
    "Saraburi",
    "Satun",
    "Sing Buri",
    "Sisaket",
    "Songkhla",
    "Sukhothai",
    "Suphan Buri",
    "Surat Thani",
    "Surin",
    "Tak",
    "Trang",
    "Trat",
    "Ubon Ratchathani",
    "Udon Thani",
    "Uthai Thani",
    "Uttaradit",
    "Yala",
    "Yasothon",
];

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve user input to a canonical province name.
pub fn canonical_province(input: &str) -> Option<&'static str> {
    let wanted = fold(input);
    if wanted.is_empty() {
        return None;
    }
    if wanted == "krungthep" || wanted == "bangkokmetropolis" {
        return Some("Bangkok");
    }
    PROVINCES.iter().copied().find(|p| fold(p) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_unique() {
        let mut folded: Vec<String> = PROVINCES.iter().map(|p| fold(p)).collect();
        folded.sort();
        folded.dedup();
        assert_eq!(folded.len(), 77);
    }

    #[test]
    fn test_lookup_is_forgiving() {
        assert_eq!(canonical_province("chiangmai"), Some("Chiang Mai"));
        assert_eq!(canonical_province("  PHUKET "), Some("Phuket"));
        assert_eq!(canonical_province("Phang-Nga"), Some("Phang Nga"));
        assert_eq!(canonical_province("Krung Thep"), Some("Bangkok"));
    }

    #[test]
    fn test_unknown_province() {
        assert_eq!(canonical_province("Atlantis"), None);
        assert_eq!(canonical_province(""), None);
    }
}
