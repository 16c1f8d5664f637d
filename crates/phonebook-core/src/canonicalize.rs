//! # Phone Number Canonicalization
//!
//! Turns free-form user input plus a region hint into a [`CanonicalNumber`].
//!
//! Two outcomes are deliberately kept apart:
//!
//! - **Unparseable** input is an error ([`ValidationError`]). Callers abort
//!   the request.
//! - **Parseable but not valid for the region** is a success with
//!   [`Canonicalized::valid_for_region`] set to `false`. Callers decide
//!   whether that is fatal (claiming an account) or skippable (one entry in
//!   a contact upload).
//!
//! The [`Canonicalizer`] trait is the seam; [`PhoneNumberCanonicalizer`] is
//! the production implementation backed by the `phonenumber` crate's port
//! of libphonenumber metadata.

use phonenumber::country;
use phonenumber::{Mode, PhoneNumber};

use crate::error::ValidationError;
use crate::number::{CanonicalNumber, RegionCode};

/// Result of canonicalizing one raw number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalized {
    /// The E.164 form of the parsed number.
    pub number: CanonicalNumber,
    /// Whether the number is a valid, assigned number in the hinted region.
    pub valid_for_region: bool,
}

/// Raw text + region → canonical number.
pub trait Canonicalizer: Send + Sync {
    /// Parse `raw` using `region` for national-format input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnparseableNumber`] when the text is not a
    /// phone number at all, and [`ValidationError::UnsupportedRegion`] when
    /// the region hint is unknown.
    fn canonicalize(&self, raw: &str, region: &RegionCode)
        -> Result<Canonicalized, ValidationError>;

    /// Parse `raw` with no region to fall back on. Only international input
    /// (`+CC...`) can succeed, and the result is never valid for a region.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnparseableNumber`] when the text does not
    /// carry its own country code.
    fn canonicalize_international(&self, raw: &str) -> Result<Canonicalized, ValidationError>;

    /// Parse `raw` against a free-form region hint from client input.
    ///
    /// An empty or unknown hint does not fail on its own: the number is
    /// parsed without a region and reported as not valid for the hint.
    fn canonicalize_hinted(&self, raw: &str, hint: &str) -> Result<Canonicalized, ValidationError> {
        match RegionCode::new(hint) {
            Ok(region) => match self.canonicalize(raw, &region) {
                Err(ValidationError::UnsupportedRegion(_)) => self.canonicalize_international(raw),
                other => other,
            },
            Err(_) => self.canonicalize_international(raw),
        }
    }
}

/// libphonenumber-backed canonicalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneNumberCanonicalizer;

impl PhoneNumberCanonicalizer {
    fn country_id(region: &RegionCode) -> Result<country::Id, ValidationError> {
        region
            .as_str()
            .parse::<country::Id>()
            .map_err(|_| ValidationError::UnsupportedRegion(region.to_string()))
    }

    fn parse(raw: &str, country: Option<country::Id>) -> Result<PhoneNumber, ValidationError> {
        phonenumber::parse(country, raw).map_err(|e| ValidationError::UnparseableNumber {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
    }

    fn e164(parsed: &PhoneNumber) -> Result<CanonicalNumber, ValidationError> {
        CanonicalNumber::new(parsed.format().mode(Mode::E164).to_string())
    }
}

impl Canonicalizer for PhoneNumberCanonicalizer {
    fn canonicalize(
        &self,
        raw: &str,
        region: &RegionCode,
    ) -> Result<Canonicalized, ValidationError> {
        let country = Self::country_id(region)?;
        let parsed = Self::parse(raw, Some(country))?;

        let number = Self::e164(&parsed)?;
        let valid_for_region =
            phonenumber::is_valid(&parsed) && parsed.country().id() == Some(country);

        Ok(Canonicalized {
            number,
            valid_for_region,
        })
    }

    fn canonicalize_international(&self, raw: &str) -> Result<Canonicalized, ValidationError> {
        let parsed = Self::parse(raw, None)?;
        Ok(Canonicalized {
            number: Self::e164(&parsed)?,
            valid_for_region: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example numbers below are libphonenumber's published examples for
    // each region, so they validate against the bundled metadata.

    fn region(code: &str) -> RegionCode {
        RegionCode::new(code).unwrap()
    }

    #[test]
    fn national_format_uses_region_hint() {
        let out = PhoneNumberCanonicalizer
            .canonicalize("070-812 34 56", &region("SE"))
            .unwrap();
        assert_eq!(out.number.as_str(), "+46708123456");
        assert!(out.valid_for_region);
    }

    #[test]
    fn spelling_variants_converge() {
        let c = PhoneNumberCanonicalizer;
        let a = c.canonicalize("+46 70 812 34 56", &region("SE")).unwrap();
        let b = c.canonicalize("0708123456", &region("se")).unwrap();
        assert_eq!(a.number, b.number);
    }

    #[test]
    fn foreign_number_is_parseable_but_region_invalid() {
        let out = PhoneNumberCanonicalizer
            .canonicalize("+1 201-555-0123", &region("SE"))
            .unwrap();
        assert_eq!(out.number.as_str(), "+12015550123");
        assert!(!out.valid_for_region);
    }

    #[test]
    fn foreign_number_valid_in_its_own_region() {
        let out = PhoneNumberCanonicalizer
            .canonicalize("+1 201-555-0123", &region("US"))
            .unwrap();
        assert!(out.valid_for_region);
    }

    #[test]
    fn text_is_unparseable() {
        let err = PhoneNumberCanonicalizer
            .canonicalize("call me maybe", &region("SE"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnparseableNumber { .. }));
    }

    #[test]
    fn empty_input_is_unparseable() {
        assert!(PhoneNumberCanonicalizer
            .canonicalize("", &region("SE"))
            .is_err());
    }

    #[test]
    fn unknown_region_rejected() {
        let err = PhoneNumberCanonicalizer
            .canonicalize("0708123456", &region("QQ"))
            .unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedRegion("QQ".into()));
    }

    #[test]
    fn blank_or_unknown_hint_still_parses_international_input() {
        let c = PhoneNumberCanonicalizer;
        for hint in ["", "QQ", "Sweden"] {
            let out = c.canonicalize_hinted("+46701234567", hint).unwrap();
            assert_eq!(out.number.as_str(), "+46701234567");
            assert!(!out.valid_for_region, "hint {hint:?}");
        }
    }

    #[test]
    fn blank_hint_with_national_input_is_unparseable() {
        let err = PhoneNumberCanonicalizer
            .canonicalize_hinted("0708123456", "")
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnparseableNumber { .. }));
    }

    #[test]
    fn known_hint_behaves_like_canonicalize() {
        let out = PhoneNumberCanonicalizer
            .canonicalize_hinted("070-812 34 56", " se ")
            .unwrap();
        assert_eq!(out.number.as_str(), "+46708123456");
        assert!(out.valid_for_region);
    }
}
