use num_derive::FromPrimitive;
use strum::Display;

/// Runtime version of the target game.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GmVersion {
    pub major: u32,
    pub minor: u32,
    pub release: u32,
    pub build: u32,
}

impl GmVersion {
    pub const fn new(major: u32, minor: u32, release: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            release,
            build,
        }
    }

    /// Lexicographic `>=` over `(major, minor, release, build)`.
    pub fn at_least(&self, major: u32, minor: u32, release: u32, build: u32) -> bool {
        (self.major, self.minor, self.release, self.build) >= (major, minor, release, build)
    }
}

/// Release branch of the runtime, as tagged by the host.
#[derive(FromPrimitive, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LtsBranch {
    Pre2022 = 1,
    Lts2022 = 2,
    Post2022 = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_is_lexicographic() {
        assert!(GmVersion::new(2, 3, 7, 0).at_least(2, 3, 7, 0));
        assert!(!GmVersion::new(2, 3, 6, 9999).at_least(2, 3, 7, 0));
        assert!(GmVersion::new(2, 4, 0, 0).at_least(2, 3, 7, 0));
        assert!(GmVersion::new(2023, 1, 0, 0).at_least(2, 3, 7, 0));
        assert!(!GmVersion::new(1, 4, 9999, 9999).at_least(2, 0, 0, 0));
        assert!(GmVersion::new(2024, 14, 0, 1).at_least(2024, 14, 0, 0));
    }

    #[test]
    fn at_least_agrees_with_tuple_ordering() {
        let samples = [0u32, 1, 2, 7];
        for a in samples {
            for b in samples {
                for c in samples {
                    let version = GmVersion::new(a, b, c, 1);
                    let query = (b, a, 1, c);
                    assert_eq!(
                        version.at_least(query.0, query.1, query.2, query.3),
                        (a, b, c, 1) >= query
                    );
                }
            }
        }
    }
}
