use crate::classifier::FeatureSample;

/// Display and input metadata for one chemical measurement.
///
/// Ranges and default midpoints are fixed domain guidance for the form; they
/// are deliberately not derived from the loaded bundle.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    /// Bundle-facing feature name
    pub name: &'static str,
    /// Human-readable label for rendering
    pub label: &'static str,
    /// Measurement unit, when one applies
    pub unit: Option<&'static str>,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Increment used by the form controls
    pub step: f64,
}

impl FeatureSpec {
    /// Clamps a value into the closed input range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Label with its unit appended, e.g. `Alcohol (%)`.
    pub fn display_label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} ({})", self.label, unit),
            None => self.label.to_string(),
        }
    }
}

/// The six measurements the form collects, in presentation order.
pub const FEATURE_SPECS: [FeatureSpec; 6] = [
    FeatureSpec {
        name: "alcohol",
        label: "Alcohol",
        unit: Some("%"),
        min: 11.0,
        max: 15.0,
        default: 13.0,
        step: 0.1,
    },
    FeatureSpec {
        name: "malic_acid",
        label: "Malic Acid",
        unit: Some("g/L"),
        min: 0.5,
        max: 6.0,
        default: 2.5,
        step: 0.1,
    },
    FeatureSpec {
        name: "total_phenols",
        label: "Total Phenols",
        unit: Some("g/L"),
        min: 0.5,
        max: 4.0,
        default: 2.0,
        step: 0.1,
    },
    FeatureSpec {
        name: "flavanoids",
        label: "Flavanoids",
        unit: Some("g/L"),
        min: 0.0,
        max: 6.0,
        default: 2.0,
        step: 0.1,
    },
    FeatureSpec {
        name: "color_intensity",
        label: "Color Intensity",
        unit: None,
        min: 1.0,
        max: 13.0,
        default: 5.0,
        step: 0.1,
    },
    FeatureSpec {
        name: "proline",
        label: "Proline",
        unit: Some("mg/L"),
        min: 250.0,
        max: 1700.0,
        default: 750.0,
        step: 10.0,
    },
];

/// Looks up the spec for a bundle feature name.
pub fn spec_for(name: &str) -> Option<&'static FeatureSpec> {
    FEATURE_SPECS.iter().find(|spec| spec.name == name)
}

/// A sample with every feature at its default midpoint.
pub fn default_sample() -> FeatureSample {
    FEATURE_SPECS
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        for spec in &FEATURE_SPECS {
            assert!(spec.min <= spec.default && spec.default <= spec.max, "{}", spec.name);
            assert!(spec.step > 0.0);
        }
    }

    #[test]
    fn test_clamp() {
        let alcohol = spec_for("alcohol").unwrap();
        assert_eq!(alcohol.clamp(10.0), 11.0);
        assert_eq!(alcohol.clamp(20.0), 15.0);
        assert_eq!(alcohol.clamp(13.4), 13.4);
    }

    #[test]
    fn test_spec_lookup() {
        assert!(spec_for("proline").is_some());
        assert!(spec_for("ash").is_none());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(spec_for("alcohol").unwrap().display_label(), "Alcohol (%)");
        assert_eq!(
            spec_for("color_intensity").unwrap().display_label(),
            "Color Intensity"
        );
    }

    #[test]
    fn test_default_sample_covers_all_features() {
        let sample = default_sample();
        assert_eq!(sample.len(), 6);
        assert_eq!(sample["proline"], 750.0);
    }
}
