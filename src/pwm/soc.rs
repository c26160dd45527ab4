//! SoC model metadata
//!
//! Static table mapping a hardware compatibility identifier to the number of
//! PWM-capable TCU channels that model carries. Looked up once when a chip
//! instance is created.

/// Per-model metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocInfo {
    /// Hardware compatibility identifier
    pub compatible: &'static str,
    /// Number of PWM-capable TCU channels
    pub num_pwms: u8,
}

/// JZ4740: eight PWM channels
pub const JZ4740: SocInfo = SocInfo {
    compatible: "ingenic,jz4740-pwm",
    num_pwms: 8,
};

/// JZ4725B: six PWM channels
pub const JZ4725B: SocInfo = SocInfo {
    compatible: "ingenic,jz4725b-pwm",
    num_pwms: 6,
};

static SOC_INFO_TABLE: [&SocInfo; 2] = [&JZ4740, &JZ4725B];

impl SocInfo {
    /// Look up model metadata by compatibility identifier
    pub fn from_compatible(compatible: &str) -> Option<&'static SocInfo> {
        SOC_INFO_TABLE
            .iter()
            .copied()
            .find(|info| info.compatible == compatible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_compatible() {
        let info = SocInfo::from_compatible("ingenic,jz4740-pwm").unwrap();
        assert_eq!(info.num_pwms, 8);

        let info = SocInfo::from_compatible("ingenic,jz4725b-pwm").unwrap();
        assert_eq!(info.num_pwms, 6);

        assert!(SocInfo::from_compatible("ingenic,jz4770-pwm").is_none());
    }
}
