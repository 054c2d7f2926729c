//! Municipalities of the target region (Tokyo Metropolis).

/// Every ward, city, town and village, in source order.
pub const TOKYO_AREAS: &[&str] = &[
    "あきる野市", "三宅村", "三鷹市", "世田谷区", "中央区", "中野区", "八丈町", "八王子市",
    "利島村", "北区", "千代田区", "台東区", "品川区", "国分寺市", "国立市", "多摩市",
    "大島町", "大田区", "奥多摩町", "小平市", "小笠原村", "小金井市", "府中市", "御蔵島村",
    "文京区", "新宿区", "新島村", "日の出町", "日野市", "昭島市", "杉並区", "東久留米市",
    "東大和市", "東村山市", "板橋区", "檜原村", "武蔵村山市", "武蔵野市", "江戸川区", "江東区",
    "清瀬市", "渋谷区", "港区", "狛江市", "瑞穂町", "町田市", "目黒区", "神津島村",
    "福生市", "稲城市", "立川市", "練馬区", "羽村市", "荒川区", "葛飾区", "西東京市",
    "調布市", "豊島区", "足立区", "青ヶ島村", "青梅市", "墨田区",
];

pub const POPULAR_AREAS: &[&str] = &[
    "渋谷区", "新宿区", "港区", "千代田区", "中央区", "品川区", "世田谷区", "目黒区", "中野区", "杉並区",
];

/// Prefecture prefixes stripped before matching a municipality.
const PREFECTURE_PREFIXES: &[&str] = &["東京都", "北海道", "大阪府", "京都府"];
const PREFECTURE_SUFFIX: char = '県';
const ADMIN_SUFFIXES: &[char] = &['区', '市', '町', '村'];

pub fn wards() -> impl Iterator<Item = &'static str> {
    TOKYO_AREAS.iter().copied().filter(|a| a.ends_with('区'))
}

pub fn cities() -> impl Iterator<Item = &'static str> {
    TOKYO_AREAS.iter().copied().filter(|a| !a.ends_with('区'))
}

pub fn is_known_area(name: &str) -> bool {
    TOKYO_AREAS.contains(&name.trim())
}

/// Drops a leading prefecture ("東京都", "神奈川県", ...) if there is one.
fn strip_prefecture(address: &str) -> &str {
    let address = address.trim();
    if let Some(rest) = PREFECTURE_PREFIXES.iter().find_map(|p| address.strip_prefix(p)) {
        return rest;
    }
    // "xx県" / "xxx県" within the first four characters.
    address
        .char_indices()
        .take(4)
        .find(|(i, c)| *c == PREFECTURE_SUFFIX && *i > 0)
        .map(|(i, c)| &address[i + c.len_utf8()..])
        .unwrap_or(address)
}

/// The administrative-area token at the start of an address, e.g. "渋谷区" from
/// "東京都渋谷区道玄坂1-2-3". Known municipalities are matched whole (so "武蔵村山市"
/// is not cut at its "村"); otherwise the shortest run ending in 区/市/町/村 wins.
pub fn extract_ward(address: &str) -> Option<&str> {
    let rest = strip_prefecture(address);
    if rest.is_empty() {
        return None;
    }

    if let Some(known) = TOKYO_AREAS
        .iter()
        .filter(|a| rest.starts_with(**a))
        .max_by_key(|a| a.len())
    {
        return Some(&rest[..known.len()]);
    }

    rest.char_indices()
        .skip(1)
        .find(|(_, c)| ADMIN_SUFFIXES.contains(c))
        .map(|(i, c)| &rest[..i + c.len_utf8()])
}
