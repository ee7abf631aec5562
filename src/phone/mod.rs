//! Destination number handling for Korean numbers dialed through an
//! international collect-call service.

/// Country calling code the collect-call service expects ahead of the
/// destination digits.
pub const KOREA_COUNTRY_CODE: &str = "82";

/// A destination in both of the forms the call flow needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Local format, e.g. `01033650654`. Used for display.
    pub display: String,
    /// Local format without its trunk `0`, e.g. `1033650654`. Used after
    /// the country code.
    pub dial: String,
}

impl Destination {
    /// Normalizes free-form input.
    ///
    /// A single leading `+` is stripped, then a leading `82` becomes `0`.
    /// Nothing is validated: digit count and character set are left for the
    /// provider to reject.
    pub fn parse(input: &str) -> Self {
        let stripped = input.strip_prefix('+').unwrap_or(input);
        let display = match stripped.strip_prefix(KOREA_COUNTRY_CODE) {
            Some(rest) => format!("0{}", rest),
            None => stripped.to_string(),
        };
        let dial = display.strip_prefix('0').unwrap_or(&display).to_string();

        Self { display, dial }
    }

    /// Touch-tone sequence entered into the collect-call menu: country code,
    /// dial form, then `#`.
    pub fn dtmf_digits(&self) -> String {
        format!("{}{}#", KOREA_COUNTRY_CODE, self.dial)
    }
}
