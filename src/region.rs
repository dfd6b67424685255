//! Region classification and static region metadata.
//!
//! Korean electoral district names are not globally unique (almost
//! every metro city has a 남구/중구/동구), so mapping a district name
//! to its administrative region cannot be a plain lookup table. The
//! classifier applies ordered rules: an explicit exception table for
//! the handful of genuinely ambiguous names, then per-region
//! substring/city-list matches, then a last-resort Seoul heuristic.
//!
//! This is the single classification policy: both the live
//! aggregation path ([`crate::aggregate`]) and the offline backfill
//! ([`crate::enrich`]) call [`classify_district`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One of the 17 top-level administrative units, plus the synthetic
/// `National` unit used only for aggregate display and `Unknown` for
/// districts no rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKey {
    National,
    Seoul,
    Busan,
    Daegu,
    Incheon,
    Gwangju,
    Daejeon,
    Ulsan,
    Sejong,
    Gyeonggi,
    Gangwon,
    Chungbuk,
    Chungnam,
    Jeonbuk,
    Jeonnam,
    Gyeongbuk,
    Gyeongnam,
    Jeju,
    Unknown,
}

impl RegionKey {
    /// The 17 real regions, in customary display order.
    pub const REGIONS: [RegionKey; 17] = [
        RegionKey::Seoul,
        RegionKey::Busan,
        RegionKey::Daegu,
        RegionKey::Incheon,
        RegionKey::Gwangju,
        RegionKey::Daejeon,
        RegionKey::Ulsan,
        RegionKey::Sejong,
        RegionKey::Gyeonggi,
        RegionKey::Gangwon,
        RegionKey::Chungbuk,
        RegionKey::Chungnam,
        RegionKey::Jeonbuk,
        RegionKey::Jeonnam,
        RegionKey::Gyeongbuk,
        RegionKey::Gyeongnam,
        RegionKey::Jeju,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKey::National => "national",
            RegionKey::Seoul => "seoul",
            RegionKey::Busan => "busan",
            RegionKey::Daegu => "daegu",
            RegionKey::Incheon => "incheon",
            RegionKey::Gwangju => "gwangju",
            RegionKey::Daejeon => "daejeon",
            RegionKey::Ulsan => "ulsan",
            RegionKey::Sejong => "sejong",
            RegionKey::Gyeonggi => "gyeonggi",
            RegionKey::Gangwon => "gangwon",
            RegionKey::Chungbuk => "chungbuk",
            RegionKey::Chungnam => "chungnam",
            RegionKey::Jeonbuk => "jeonbuk",
            RegionKey::Jeonnam => "jeonnam",
            RegionKey::Gyeongbuk => "gyeongbuk",
            RegionKey::Gyeongnam => "gyeongnam",
            RegionKey::Jeju => "jeju",
            RegionKey::Unknown => "unknown",
        }
    }

    /// Short Korean label written into the `metro_city` column by the
    /// offline backfill. `None` for the synthetic keys.
    pub fn metro_label(&self) -> Option<&'static str> {
        match self {
            RegionKey::Seoul => Some("서울"),
            RegionKey::Busan => Some("부산"),
            RegionKey::Daegu => Some("대구"),
            RegionKey::Incheon => Some("인천"),
            RegionKey::Gwangju => Some("광주"),
            RegionKey::Daejeon => Some("대전"),
            RegionKey::Ulsan => Some("울산"),
            RegionKey::Sejong => Some("세종"),
            RegionKey::Gyeonggi => Some("경기"),
            RegionKey::Gangwon => Some("강원"),
            RegionKey::Chungbuk => Some("충북"),
            RegionKey::Chungnam => Some("충남"),
            RegionKey::Jeonbuk => Some("전북"),
            RegionKey::Jeonnam => Some("전남"),
            RegionKey::Gyeongbuk => Some("경북"),
            RegionKey::Gyeongnam => Some("경남"),
            RegionKey::Jeju => Some("제주"),
            RegionKey::National | RegionKey::Unknown => None,
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let extras = [RegionKey::National, RegionKey::Unknown];
        for key in RegionKey::REGIONS.iter().chain(extras.iter()) {
            if key.as_str() == s {
                return Ok(*key);
            }
        }
        Err(format!("unknown region key: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionType {
    National,
    Metropolitan,
    Province,
    Special,
}

/// Static metadata for a region; no mutation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionInfo {
    pub key: RegionKey,
    pub name: &'static str,
    pub region_type: RegionType,
    pub population: u64,
    pub districts: u32,
}

static REGION_METADATA: Lazy<HashMap<RegionKey, RegionInfo>> = Lazy::new(|| {
    use RegionKey::*;
    let rows = [
        (National, "대한민국", RegionType::National, 51_628_117, 254),
        (Seoul, "서울특별시", RegionType::Metropolitan, 9_720_846, 48),
        (Busan, "부산광역시", RegionType::Metropolitan, 3_349_016, 18),
        (Daegu, "대구광역시", RegionType::Metropolitan, 2_385_412, 12),
        (Incheon, "인천광역시", RegionType::Metropolitan, 2_948_375, 14),
        (Gwangju, "광주광역시", RegionType::Metropolitan, 1_441_611, 8),
        (Daejeon, "대전광역시", RegionType::Metropolitan, 1_452_251, 7),
        (Ulsan, "울산광역시", RegionType::Metropolitan, 1_121_592, 6),
        (Sejong, "세종특별자치시", RegionType::Special, 371_895, 2),
        (Gyeonggi, "경기도", RegionType::Province, 13_565_450, 60),
        (Gangwon, "강원특별자치도", RegionType::Special, 1_536_448, 8),
        (Chungbuk, "충청북도", RegionType::Province, 1_597_179, 8),
        (Chungnam, "충청남도", RegionType::Province, 2_119_257, 11),
        (Jeonbuk, "전북특별자치도", RegionType::Special, 1_786_855, 10),
        (Jeonnam, "전라남도", RegionType::Province, 1_832_803, 10),
        (Gyeongbuk, "경상북도", RegionType::Province, 2_626_609, 13),
        (Gyeongnam, "경상남도", RegionType::Province, 3_314_183, 16),
        (Jeju, "제주특별자치도", RegionType::Special, 674_635, 3),
    ];
    rows.into_iter()
        .map(|(key, name, region_type, population, districts)| {
            (
                key,
                RegionInfo {
                    key,
                    name,
                    region_type,
                    population,
                    districts,
                },
            )
        })
        .collect()
});

pub fn region_info(key: RegionKey) -> Option<&'static RegionInfo> {
    REGION_METADATA.get(&key)
}

/// Ambiguous single-word district names that several metro cities
/// share; the winning candidate's name picks the city. Checked before
/// every other rule.
const EXCEPTIONS: [(&str, &str, RegionKey); 9] = [
    ("남구", "박수영", RegionKey::Busan),
    ("남구갑", "김상욱", RegionKey::Ulsan),
    ("남구을", "김기현", RegionKey::Ulsan),
    ("북구", "윤종오", RegionKey::Ulsan),
    ("동구", "김태선", RegionKey::Ulsan),
    ("동구", "장철민", RegionKey::Daejeon),
    ("서구", "김상훈", RegionKey::Daegu),
    ("중구", "박성민", RegionKey::Ulsan),
    ("중구", "박용갑", RegionKey::Daejeon),
];

const BUSAN_DISTRICTS: [&str; 11] = [
    "중구영도구", "서구동구", "부산진구", "동래구", "해운대구", "사하구", "금정구", "연제구",
    "수영구", "사상구", "기장군",
];

const DAEGU_DISTRICTS: [&str; 6] = ["중구남구", "동구군위군", "수성구", "달서구", "달성군", "북구"];

const INCHEON_DISTRICTS: [&str; 7] = [
    "중구강화군옹진군", "동구미추홀구", "연수구", "남동구", "부평구", "계양구", "서구",
];

const GYEONGGI_CITIES: [&str; 30] = [
    "수원시", "성남시", "의정부시", "안양시", "부천시", "광명시", "평택시", "동두천시", "안산시",
    "고양시", "과천시", "구리시", "남양주시", "오산시", "시흥시", "군포시", "하남시", "용인시",
    "파주시", "이천시", "안성시", "김포시", "화성시", "광주시", "양주시", "포천시", "여주시",
    "연천군", "가평군", "양평군",
];

const GANGWON_CITIES: [&str; 18] = [
    "춘천", "원주", "강릉", "동해", "태백", "속초", "삼척", "홍천", "횡성", "영월", "평창", "정선",
    "철원", "화천", "양구", "인제", "고성", "양양",
];

const CHUNGBUK_CITIES: [&str; 11] = [
    "청주", "충주", "제천", "보은", "옥천", "영동", "증평", "진천", "괴산", "음성", "단양",
];

const CHUNGNAM_CITIES: [&str; 15] = [
    "천안", "공주", "보령", "아산", "서산", "논산", "계룡", "당진", "금산", "부여", "서천", "청양",
    "홍성", "예산", "태안",
];

const JEONBUK_CITIES: [&str; 14] = [
    "전주", "군산", "익산", "정읍", "남원", "김제", "완주", "진안", "무주", "장수", "임실", "순창",
    "고창", "부안",
];

const JEONNAM_CITIES: [&str; 22] = [
    "목포", "여수", "순천", "나주", "광양", "담양", "곡성", "구례", "고흥", "보성", "화순", "장흥",
    "강진", "해남", "영암", "무안", "함평", "영광", "장성", "완도", "진도", "신안",
];

const GYEONGBUK_CITIES: [&str; 23] = [
    "포항", "경주", "김천", "안동", "구미", "영주", "영천", "상주", "문경", "경산", "군위", "의성",
    "청송", "영양", "영덕", "청도", "고령", "성주", "칠곡", "예천", "봉화", "울진", "울릉",
];

const GYEONGNAM_CITIES: [&str; 18] = [
    "창원", "진주", "통영", "사천", "김해", "밀양", "거제", "양산", "의령", "함안", "창녕", "고성",
    "남해", "하동", "산청", "함양", "거창", "합천",
];

fn contains_any(district: &str, names: &[&str]) -> bool {
    names.iter().any(|name| district.contains(name))
}

/// Maps a free-text district name to its region. Pure, deterministic
/// and total: never fails, returns [`RegionKey::Unknown`] when no rule
/// applies. `candidate` feeds the exception table only.
///
/// Rules are ordered and first-match-wins. The final Seoul rule
/// (district contains 구 but not 시) is a heuristic, not a lookup: it
/// is correct for the current dataset because every non-Seoul 구 is
/// caught by an earlier rule, but it will silently misclassify a
/// future district outside the explicit lists. Prefer extending the
/// city lists over relying on it.
pub fn classify_district(district: Option<&str>, candidate: Option<&str>) -> RegionKey {
    let district = match district {
        Some(d) if !d.trim().is_empty() => d.trim(),
        _ => return RegionKey::Unknown,
    };

    if let Some(candidate) = candidate {
        for (name, person, region) in EXCEPTIONS {
            if district == name && candidate == person {
                return region;
            }
        }
    }

    // Metro cities carry their own name in composite districts
    // (e.g. 부산진구) or match a fixed sub-district list.
    if district.contains("부산") || contains_any(district, &BUSAN_DISTRICTS) {
        return RegionKey::Busan;
    }
    if district.contains("대구") || contains_any(district, &DAEGU_DISTRICTS) {
        return RegionKey::Daegu;
    }
    if district.contains("인천") || contains_any(district, &INCHEON_DISTRICTS) {
        return RegionKey::Incheon;
    }
    // 광주시 (Gyeonggi) also contains 광주; the 시 check splits them.
    if district.contains("광주") && !district.contains('시') {
        return RegionKey::Gwangju;
    }
    if district.contains("대전") || district.contains("유성구") || district.contains("대덕구") {
        return RegionKey::Daejeon;
    }
    if district.contains("울산") || district.contains("울주군") {
        return RegionKey::Ulsan;
    }
    if district.contains("세종") {
        return RegionKey::Sejong;
    }

    if contains_any(district, &GYEONGGI_CITIES) {
        return RegionKey::Gyeonggi;
    }
    if contains_any(district, &GANGWON_CITIES) {
        return RegionKey::Gangwon;
    }
    if contains_any(district, &CHUNGBUK_CITIES) {
        return RegionKey::Chungbuk;
    }
    if contains_any(district, &CHUNGNAM_CITIES) {
        return RegionKey::Chungnam;
    }
    if contains_any(district, &JEONBUK_CITIES) {
        return RegionKey::Jeonbuk;
    }
    if contains_any(district, &JEONNAM_CITIES) {
        return RegionKey::Jeonnam;
    }
    if contains_any(district, &GYEONGBUK_CITIES) {
        return RegionKey::Gyeongbuk;
    }
    if contains_any(district, &GYEONGNAM_CITIES) {
        return RegionKey::Gyeongnam;
    }
    if district.contains("제주") || district.contains("서귀포") {
        return RegionKey::Jeju;
    }

    // Last-resort heuristic, see the function docs.
    if district.contains('구') && !district.contains('시') {
        return RegionKey::Seoul;
    }

    RegionKey::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(district: &str) -> RegionKey {
        classify_district(Some(district), None)
    }

    #[test]
    fn seoul_districts_fall_through_to_the_capital_rule() {
        assert_eq!(classify("종로구"), RegionKey::Seoul);
        assert_eq!(classify("동대문구갑"), RegionKey::Seoul);
        assert_eq!(classify("중구성동구을"), RegionKey::Seoul);
    }

    #[test]
    fn metro_sub_district_lists_match() {
        assert_eq!(classify("해운대구갑"), RegionKey::Busan);
        assert_eq!(classify("부산진구을"), RegionKey::Busan);
        assert_eq!(classify("수성구갑"), RegionKey::Daegu);
        assert_eq!(classify("동구군위군을"), RegionKey::Daegu);
        assert_eq!(classify("중구강화군옹진군"), RegionKey::Incheon);
        assert_eq!(classify("부평구갑"), RegionKey::Incheon);
        assert_eq!(classify("유성구을"), RegionKey::Daejeon);
        assert_eq!(classify("울주군"), RegionKey::Ulsan);
    }

    #[test]
    fn exception_table_beats_generic_rules() {
        // Plain 남구 would hit the Seoul fallback without the override.
        assert_eq!(classify_district(Some("남구"), Some("박수영")), RegionKey::Busan);
        assert_eq!(classify_district(Some("중구"), Some("박용갑")), RegionKey::Daejeon);
        assert_eq!(classify_district(Some("중구"), Some("박성민")), RegionKey::Ulsan);
        assert_eq!(classify_district(Some("서구"), Some("김상훈")), RegionKey::Daegu);
        // Same district, different candidate: exception does not fire.
        assert_eq!(classify_district(Some("남구"), Some("아무개")), RegionKey::Seoul);
    }

    #[test]
    fn gwangju_requires_absence_of_si() {
        assert_eq!(classify("광주광산구갑"), RegionKey::Gwangju);
        // 광주시 is the Gyeonggi city of the same name.
        assert_eq!(classify("광주시갑"), RegionKey::Gyeonggi);
    }

    #[test]
    fn province_city_lists_match() {
        assert_eq!(classify("수원시무"), RegionKey::Gyeonggi);
        assert_eq!(classify("김해시을"), RegionKey::Gyeongnam);
        assert_eq!(classify("춘천시철원군화천군양구군갑"), RegionKey::Gangwon);
        assert_eq!(classify("청주시상당구"), RegionKey::Chungbuk);
        assert_eq!(classify("천안시갑"), RegionKey::Chungnam);
        assert_eq!(classify("전주시병"), RegionKey::Jeonbuk);
        assert_eq!(classify("목포시"), RegionKey::Jeonnam);
        assert_eq!(classify("구미시을"), RegionKey::Gyeongbuk);
        assert_eq!(classify("제주시갑"), RegionKey::Jeju);
        assert_eq!(classify("서귀포시"), RegionKey::Jeju);
    }

    #[test]
    fn go_seong_resolves_to_gangwon_by_rule_order() {
        // 고성 appears in both the Gangwon and Gyeongnam lists; Gangwon
        // is checked first, as it always has been.
        assert_eq!(classify("속초시인제군고성군양양군"), RegionKey::Gangwon);
    }

    #[test]
    fn capital_fallback_is_a_heuristic() {
        // Accepted heuristic, not a correctness guarantee.
        assert_eq!(classify("정체불명구"), RegionKey::Seoul);
        assert_eq!(classify("세종특별자치시갑"), RegionKey::Sejong);
    }

    #[test]
    fn missing_or_blank_district_is_unknown() {
        assert_eq!(classify_district(None, None), RegionKey::Unknown);
        assert_eq!(classify_district(Some("  "), Some("박수영")), RegionKey::Unknown);
        assert_eq!(classify("온천마을"), RegionKey::Unknown);
    }

    #[test]
    fn metadata_covers_all_regions() {
        for key in RegionKey::REGIONS {
            let info = region_info(key).expect("metadata for every region");
            assert_eq!(info.key, key);
            assert!(info.population > 0);
            assert!(info.districts > 0);
        }
        assert_eq!(region_info(RegionKey::National).map(|i| i.districts), Some(254));
        assert!(region_info(RegionKey::Unknown).is_none());
    }

    #[test]
    fn keys_round_trip_through_strings() {
        for key in RegionKey::REGIONS {
            assert_eq!(key.as_str().parse::<RegionKey>(), Ok(key));
            assert!(key.metro_label().is_some());
        }
        assert!("mars".parse::<RegionKey>().is_err());
    }
}
