use icu_locid::Locale;
use icu_plurals::{PluralCategory as IcuPluralCategory, PluralOperands, PluralRules};
use phrasekit_template::{PluralCategory, PluralSelector};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::localization::LocalizationError;

/// Cardinal plural rules for one locale, backed by ICU compiled data.
#[derive(Clone)]
pub struct IcuPluralSelector {
    locale: String,
    rules: Option<Arc<PluralRules>>,
}

impl IcuPluralSelector {
    /// Builds the selector for a BCP-47 locale code.
    /// Locales without ICU plural data select `one` for 1 and `other` otherwise.
    pub fn for_locale(code: &str) -> Result<Self, LocalizationError> {
        let parsed =
            Locale::from_str(code).map_err(|error| LocalizationError::InvalidLocaleIdentifier {
                locale: code.to_string(),
                error,
            })?;
        let rules = match PluralRules::try_new_cardinal(&parsed.into()) {
            Ok(rules) => Some(Arc::new(rules)),
            Err(error) => {
                tracing::debug!(locale = code, %error, "no plural rules; using one/other");
                None
            }
        };
        Ok(Self {
            locale: code.to_string(),
            rules,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn has_locale_rules(&self) -> bool {
        self.rules.is_some()
    }
}

impl fmt::Debug for IcuPluralSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcuPluralSelector")
            .field("locale", &self.locale)
            .field("has_locale_rules", &self.has_locale_rules())
            .finish()
    }
}

impl PluralSelector for IcuPluralSelector {
    fn select(&self, value: f64) -> PluralCategory {
        if !value.is_finite() {
            return PluralCategory::Other;
        }
        let magnitude = value.abs();
        if let Some(rules) = self.rules.as_deref() {
            if let Ok(operands) = PluralOperands::from_str(&operand_text(magnitude)) {
                return category_from_icu(rules.category_for(operands));
            }
        }
        if magnitude == 1.0 {
            PluralCategory::One
        } else {
            PluralCategory::Other
        }
    }
}

fn category_from_icu(value: IcuPluralCategory) -> PluralCategory {
    match value {
        IcuPluralCategory::Zero => PluralCategory::Zero,
        IcuPluralCategory::One => PluralCategory::One,
        IcuPluralCategory::Two => PluralCategory::Two,
        IcuPluralCategory::Few => PluralCategory::Few,
        IcuPluralCategory::Many => PluralCategory::Many,
        IcuPluralCategory::Other => PluralCategory::Other,
    }
}

fn operand_text(value: f64) -> String {
    if value.fract() == 0.0 && value < 1e15 {
        format!("{}", value as u64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_rules() {
        let selector = IcuPluralSelector::for_locale("en").unwrap();
        assert!(selector.has_locale_rules());
        assert_eq!(selector.select(1.0), PluralCategory::One);
        assert_eq!(selector.select(0.0), PluralCategory::Other);
        assert_eq!(selector.select(2.0), PluralCategory::Other);
        assert_eq!(selector.select(1.5), PluralCategory::Other);
        assert_eq!(selector.select(-1.0), PluralCategory::One);
    }

    #[test]
    fn russian_rules() {
        let selector = IcuPluralSelector::for_locale("ru-RU").unwrap();
        assert_eq!(selector.select(1.0), PluralCategory::One);
        assert_eq!(selector.select(3.0), PluralCategory::Few);
        assert_eq!(selector.select(5.0), PluralCategory::Many);
        assert_eq!(selector.select(21.0), PluralCategory::One);
    }

    #[test]
    fn arabic_uses_all_categories() {
        let selector = IcuPluralSelector::for_locale("ar").unwrap();
        assert_eq!(selector.select(0.0), PluralCategory::Zero);
        assert_eq!(selector.select(2.0), PluralCategory::Two);
        assert_eq!(selector.select(3.0), PluralCategory::Few);
        assert_eq!(selector.select(11.0), PluralCategory::Many);
        assert_eq!(selector.select(100.0), PluralCategory::Other);
    }

    #[test]
    fn not_a_number_selects_other() {
        let selector = IcuPluralSelector::for_locale("en").unwrap();
        assert_eq!(selector.select(f64::NAN), PluralCategory::Other);
        assert_eq!(selector.select(f64::INFINITY), PluralCategory::Other);
    }

    #[test]
    fn malformed_locale_is_rejected() {
        let error = IcuPluralSelector::for_locale("not a locale!").unwrap_err();
        assert!(matches!(
            error,
            LocalizationError::InvalidLocaleIdentifier { .. }
        ));
    }
}
