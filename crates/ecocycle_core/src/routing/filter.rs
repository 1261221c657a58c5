use crate::model::{Seller, VolumeTier};
use crate::normalize::normalize_text;

/// Narrow the seller map down by material and volume tier.
#[derive(Debug, Clone, Default)]
pub struct SellerFilter {
    material_norm: Option<String>,
    volume: Option<VolumeTier>,
}

impl SellerFilter {
    /// `None`, empty strings and `"all"` disable the respective criterion.
    pub fn new(material: Option<&str>, volume: Option<VolumeTier>) -> Self {
        let material_norm = material
            .map(normalize_text)
            .filter(|m| !m.is_empty() && m != "all");

        Self {
            material_norm,
            volume,
        }
    }

    /// Same as [`SellerFilter::new`] but parses the tier, accepting `"all"`.
    pub fn parse(material: Option<&str>, volume: Option<&str>) -> anyhow::Result<Self> {
        let volume = match volume.map(str::trim) {
            None | Some("") => None,
            Some(v) if v.eq_ignore_ascii_case("all") => None,
            Some(v) => Some(v.parse::<VolumeTier>()?),
        };
        Ok(Self::new(material, volume))
    }

    pub fn matches(&self, seller: &Seller) -> bool {
        let material_ok = match &self.material_norm {
            None => true,
            Some(m) => seller.items.iter().any(|item| normalize_text(item) == *m),
        };
        let volume_ok = self.volume.is_none_or(|v| seller.volume == v);

        material_ok && volume_ok
    }

    pub fn apply(&self, sellers: Vec<Seller>) -> Vec<Seller> {
        sellers.into_iter().filter(|s| self.matches(s)).collect()
    }
}
