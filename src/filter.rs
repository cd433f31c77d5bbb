use crate::types::{Facet, FilterKey, HierarchyLevel};
use serde::Serialize;

/// Current dropdown selections. An empty selection means "all".
///
/// Hierarchy levels cascade: replacing a level clears every level below it.
/// Facets are independent of the hierarchy and of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    year_cap: Vec<String>,
    year_cip: Vec<String>,
    activity_type: Vec<String>,
    levels: [Vec<String>; 4],
}

// Trims, drops blanks and duplicates while keeping selection order.
fn normalize<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for v in values {
        let v = v.into().trim().to_string();
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection at `level` and clear every level below it.
    pub fn set_selection<I, S>(&mut self, level: HierarchyLevel, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels[level.index()] = normalize(values);
        for below in level.descendants() {
            self.levels[below.index()].clear();
        }
    }

    pub fn set_facet<I, S>(&mut self, facet: Facet, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.facet_mut(facet) = normalize(values);
    }

    pub fn set<I, S>(&mut self, key: FilterKey, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match key {
            FilterKey::Facet(f) => self.set_facet(f, values),
            FilterKey::Level(l) => self.set_selection(l, values),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stored selection at `level`; empty means unrestricted.
    pub fn effective(&self, level: HierarchyLevel) -> &[String] {
        &self.levels[level.index()]
    }

    pub fn facet(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::YearCap => &self.year_cap,
            Facet::YearCip => &self.year_cip,
            Facet::ActivityType => &self.activity_type,
        }
    }

    fn facet_mut(&mut self, facet: Facet) -> &mut Vec<String> {
        match facet {
            Facet::YearCap => &mut self.year_cap,
            Facet::YearCip => &mut self.year_cip,
            Facet::ActivityType => &mut self.activity_type,
        }
    }

    pub fn get(&self, key: FilterKey) -> &[String] {
        match key {
            FilterKey::Facet(f) => self.facet(f),
            FilterKey::Level(l) => self.effective(l),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
            && Facet::ALL.iter().all(|f| self.facet(*f).is_empty())
    }

    /// Deepest hierarchy level carrying a selection.
    pub fn deepest_selected(&self) -> Option<HierarchyLevel> {
        HierarchyLevel::ALL
            .into_iter()
            .rev()
            .find(|l| !self.effective(*l).is_empty())
    }

    /// Key/value pairs in API order, one pair per selected value.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let facets = Facet::ALL
            .into_iter()
            .map(|f| (f.query_key(), self.facet(f)));
        let levels = HierarchyLevel::ALL
            .into_iter()
            .map(|l| (l.query_key(), self.effective(l)));
        facets
            .chain(levels)
            .flat_map(|(key, values)| values.iter().map(move |v| (key, v.as_str())))
            .collect()
    }

    /// Query string with repeated keys (`wilayah=a&wilayah=b`), never
    /// comma-joined. Unrestricted selections contribute nothing.
    pub fn to_query_string(&self) -> String {
        encode_pairs(self.query_pairs())
    }
}

/// Form-encode pairs the way browsers' `URLSearchParams` does.
pub fn encode_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        query.append_pair(k.as_ref(), v.as_ref());
    }
    query.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_change_clears_descendants_but_not_facets() {
        let mut f = FilterState::new();
        f.set_facet(Facet::YearCip, ["2024"]);
        f.set_selection(HierarchyLevel::Region, ["Pusat"]);
        f.set_selection(HierarchyLevel::District, ["Gambir"]);
        f.set_selection(HierarchyLevel::RwUnit, ["RW 01"]);

        f.set_selection(HierarchyLevel::Region, ["Barat"]);
        assert_eq!(f.effective(HierarchyLevel::Region), ["Barat"]);
        assert!(f.effective(HierarchyLevel::District).is_empty());
        assert!(f.effective(HierarchyLevel::RwUnit).is_empty());
        assert_eq!(f.facet(Facet::YearCip), ["2024"]);
    }

    #[test]
    fn selection_is_trimmed_and_deduplicated_in_order() {
        let mut f = FilterState::new();
        f.set_selection(HierarchyLevel::Region, [" Utara", "Pusat", "Utara ", ""]);
        assert_eq!(f.effective(HierarchyLevel::Region), ["Utara", "Pusat"]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut f = FilterState::new();
        f.set_facet(Facet::ActivityType, ["Trotoar"]);
        f.set_selection(HierarchyLevel::SubDistrict, ["Kebon Kelapa"]);
        f.reset();
        assert!(f.is_unrestricted());
    }

    #[test]
    fn query_string_repeats_keys() {
        let mut f = FilterState::new();
        f.set_facet(Facet::YearCap, ["2023", "2024"]);
        f.set_selection(HierarchyLevel::Region, ["Kota Adm. Jakarta Pusat", "Barat"]);
        assert_eq!(
            f.to_query_string(),
            "tahun_cap=2023&tahun_cap=2024&wilayah=Kota+Adm.+Jakarta+Pusat&wilayah=Barat"
        );
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let mut f = FilterState::new();
        f.set_selection(HierarchyLevel::RwUnit, ["RW 01/02 & 03"]);
        f.set_facet(Facet::ActivityType, ["Jalan (Beton)"]);
        assert_eq!(
            f.to_query_string(),
            "nama_kegiatan=Jalan+%28Beton%29&rw=RW+01%2F02+%26+03"
        );
        assert_eq!(FilterState::new().to_query_string(), "");
    }
}
