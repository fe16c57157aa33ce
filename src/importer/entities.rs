//! Characters that have a single-character HTML5 named reference.
//!
//! Plain-text chapters are written with every such character replaced by its
//! decimal numeric reference (`&#N;`), so punctuation and typographic symbols
//! survive any later re-encoding of the document. Line feed is excluded: it
//! is turned into `<br>` by the text importer instead.

/// Inclusive code point ranges, sorted and non-overlapping.
const NAMED_CHARACTER_RANGES: &[(u32, u32)] = &[
    (0x0009, 0x0009), (0x0021, 0x002C), (0x002E, 0x002F), (0x003A, 0x0040), (0x005B, 0x0060),
    (0x007B, 0x007D), (0x00A0, 0x0113), (0x0116, 0x0122), (0x0124, 0x012B), (0x012E, 0x014D),
    (0x0150, 0x017E), (0x0192, 0x0192), (0x01B5, 0x01B5), (0x01F5, 0x01F5), (0x0237, 0x0237),
    (0x02C6, 0x02C7), (0x02D8, 0x02DD), (0x0311, 0x0311), (0x0391, 0x03A1), (0x03A3, 0x03A9),
    (0x03B1, 0x03C9), (0x03D1, 0x03D2), (0x03D5, 0x03D6), (0x03DC, 0x03DD), (0x03F0, 0x03F1),
    (0x03F5, 0x03F6), (0x0401, 0x040C), (0x040E, 0x044F), (0x0451, 0x045C), (0x045E, 0x045F),
    (0x2002, 0x2005), (0x2007, 0x2010), (0x2013, 0x2016), (0x2018, 0x201A), (0x201C, 0x201E),
    (0x2020, 0x2022), (0x2025, 0x2026), (0x2030, 0x2035), (0x2039, 0x203A), (0x203E, 0x203E),
    (0x2041, 0x2041), (0x2043, 0x2044), (0x204F, 0x204F), (0x2057, 0x2057), (0x205F, 0x2063),
    (0x20AC, 0x20AC), (0x20DB, 0x20DC), (0x2102, 0x2102), (0x2105, 0x2105), (0x210A, 0x2113),
    (0x2115, 0x211E), (0x2122, 0x2122), (0x2124, 0x2124), (0x2127, 0x2129), (0x212C, 0x212D),
    (0x212F, 0x2131), (0x2133, 0x2138), (0x2145, 0x2148), (0x2153, 0x215E), (0x2190, 0x219B),
    (0x219D, 0x21A7), (0x21A9, 0x21AE), (0x21B0, 0x21B3), (0x21B5, 0x21B7), (0x21BA, 0x21DB),
    (0x21DD, 0x21DD), (0x21E4, 0x21E5), (0x21F5, 0x21F5), (0x21FD, 0x2205), (0x2207, 0x2209),
    (0x220B, 0x220C), (0x220F, 0x2214), (0x2216, 0x2218), (0x221A, 0x221A), (0x221D, 0x2238),
    (0x223A, 0x2257), (0x2259, 0x225A), (0x225C, 0x225C), (0x225F, 0x2262), (0x2264, 0x228B),
    (0x228D, 0x229B), (0x229D, 0x22A5), (0x22A7, 0x22B0), (0x22B2, 0x22BB), (0x22BD, 0x22DB),
    (0x22DE, 0x22E3), (0x22E6, 0x22F7), (0x22F9, 0x22FE), (0x2305, 0x2306), (0x2308, 0x2310),
    (0x2312, 0x2313), (0x2315, 0x2316), (0x231C, 0x231F), (0x2322, 0x2323), (0x232D, 0x232E),
    (0x2336, 0x2336), (0x233D, 0x233D), (0x233F, 0x233F), (0x237C, 0x237C), (0x23B0, 0x23B1),
    (0x23B4, 0x23B6), (0x23DC, 0x23DF), (0x23E2, 0x23E2), (0x23E7, 0x23E7), (0x2423, 0x2423),
    (0x24C8, 0x24C8), (0x2500, 0x2500), (0x2502, 0x2502), (0x250C, 0x250C), (0x2510, 0x2510),
    (0x2514, 0x2514), (0x2518, 0x2518), (0x251C, 0x251C), (0x2524, 0x2524), (0x252C, 0x252C),
    (0x2534, 0x2534), (0x253C, 0x253C), (0x2550, 0x256C), (0x2580, 0x2580), (0x2584, 0x2584),
    (0x2588, 0x2588), (0x2591, 0x2593), (0x25A1, 0x25A1), (0x25AA, 0x25AB), (0x25AD, 0x25AE),
    (0x25B1, 0x25B1), (0x25B3, 0x25B5), (0x25B8, 0x25B9), (0x25BD, 0x25BF), (0x25C2, 0x25C3),
    (0x25CA, 0x25CB), (0x25EC, 0x25EC), (0x25EF, 0x25EF), (0x25F8, 0x25FC), (0x2605, 0x2606),
    (0x260E, 0x260E), (0x2640, 0x2640), (0x2642, 0x2642), (0x2660, 0x2660), (0x2663, 0x2663),
    (0x2665, 0x2666), (0x266A, 0x266A), (0x266D, 0x266F), (0x2713, 0x2713), (0x2717, 0x2717),
    (0x2720, 0x2720), (0x2736, 0x2736), (0x2758, 0x2758), (0x2772, 0x2773), (0x27C8, 0x27C9),
    (0x27E6, 0x27ED), (0x27F5, 0x27FA), (0x27FC, 0x27FC), (0x27FF, 0x27FF), (0x2902, 0x2905),
    (0x290C, 0x2913), (0x2916, 0x2916), (0x2919, 0x2920), (0x2923, 0x292A), (0x2933, 0x2933),
    (0x2935, 0x2939), (0x293C, 0x293D), (0x2945, 0x2945), (0x2948, 0x294B), (0x294E, 0x2976),
    (0x2978, 0x2979), (0x297B, 0x297F), (0x2985, 0x2986), (0x298B, 0x2996), (0x299A, 0x299A),
    (0x299C, 0x299D), (0x29A4, 0x29B7), (0x29B9, 0x29B9), (0x29BB, 0x29BC), (0x29BE, 0x29C5),
    (0x29C9, 0x29C9), (0x29CD, 0x29D0), (0x29DC, 0x29DE), (0x29E3, 0x29E5), (0x29EB, 0x29EB),
    (0x29F4, 0x29F4), (0x29F6, 0x29F6), (0x2A00, 0x2A02), (0x2A04, 0x2A04), (0x2A06, 0x2A06),
    (0x2A0C, 0x2A0D), (0x2A10, 0x2A17), (0x2A22, 0x2A27), (0x2A29, 0x2A2A), (0x2A2D, 0x2A31),
    (0x2A33, 0x2A3C), (0x2A3F, 0x2A40), (0x2A42, 0x2A4D), (0x2A50, 0x2A50), (0x2A53, 0x2A58),
    (0x2A5A, 0x2A5D), (0x2A5F, 0x2A5F), (0x2A66, 0x2A66), (0x2A6A, 0x2A6A), (0x2A6D, 0x2A75),
    (0x2A77, 0x2A9A), (0x2A9D, 0x2AA2), (0x2AA4, 0x2AB0), (0x2AB3, 0x2AC8), (0x2ACB, 0x2ACC),
    (0x2ACF, 0x2ADB), (0x2AE4, 0x2AE4), (0x2AE6, 0x2AE9), (0x2AEB, 0x2AF3), (0x2AFD, 0x2AFD),
    (0xFB00, 0xFB04), (0x1D49C, 0x1D49C), (0x1D49E, 0x1D49F), (0x1D4A2, 0x1D4A2), (0x1D4A5, 0x1D4A6),
    (0x1D4A9, 0x1D4AC), (0x1D4AE, 0x1D4B9), (0x1D4BB, 0x1D4BB), (0x1D4BD, 0x1D4C3), (0x1D4C5, 0x1D4CF),
    (0x1D504, 0x1D505), (0x1D507, 0x1D50A), (0x1D50D, 0x1D514), (0x1D516, 0x1D51C), (0x1D51E, 0x1D539),
    (0x1D53B, 0x1D53E), (0x1D540, 0x1D544), (0x1D546, 0x1D546), (0x1D54A, 0x1D550), (0x1D552, 0x1D56B),
];

/// Whether `c` is the value of some HTML5 named character reference.
pub fn is_named_entity_char(c: char) -> bool {
    let code = c as u32;
    NAMED_CHARACTER_RANGES
        .binary_search_by(|&(start, end)| {
            if end < code {
                std::cmp::Ordering::Less
            } else if start > code {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Replaces every named-entity character in `text` with its numeric reference.
pub fn encode_entities(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        if is_named_entity_char(c) {
            encoded.push_str(&format!("&#{};", c as u32));
        } else {
            encoded.push(c);
        }
    }
    encoded
}
