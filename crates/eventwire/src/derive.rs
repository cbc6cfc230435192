#![forbid(unsafe_code)]

//! Event-name derivation from handler method names.
//!
//! A listener registered without an explicit event name takes it from the
//! method name by convention: `onEventName` listens for `eventName`. The
//! transformation is fixed and deliberately dumb — drop the first two
//! characters (assumed to be the `on` prefix), lower-case the next one,
//! keep the rest unchanged.
//!
//! Names that do not follow the convention produce whatever that
//! transformation yields; that is a caller-contract violation, not an error
//! this module detects. Callers that cannot follow the convention supply an
//! explicit name instead.

/// Derive an event name from a conventionally named handler method.
///
/// ```
/// use eventwire::derive_event_name;
///
/// assert_eq!(derive_event_name("onWidget"), "widget");
/// assert_eq!(derive_event_name("onOrangesEvent"), "orangesEvent");
/// ```
#[must_use]
pub fn derive_event_name(method_name: &str) -> String {
    let mut chars = method_name.chars().skip(2);
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_from_on_prefix() {
        assert_eq!(derive_event_name("onWidget"), "widget");
        assert_eq!(derive_event_name("onInferredEvent"), "inferredEvent");
        assert_eq!(derive_event_name("onX"), "x");
    }

    #[test]
    fn only_the_first_letter_is_lowered() {
        assert_eq!(derive_event_name("onDOMReady"), "dOMReady");
    }

    #[test]
    fn already_lowercase_passes_through() {
        assert_eq!(derive_event_name("onwidget"), "widget");
    }

    #[test]
    fn short_names_yield_empty() {
        assert_eq!(derive_event_name("on"), "");
        assert_eq!(derive_event_name("o"), "");
        assert_eq!(derive_event_name(""), "");
    }

    #[test]
    fn nonconforming_names_are_transformed_blindly() {
        // Contract violation: no `on` prefix. The fixed transformation still
        // applies.
        assert_eq!(derive_event_name("handleClick"), "ndleClick");
    }

    proptest! {
        #[test]
        fn conforming_names_round_trip(first in "[A-Za-z]", rest in "[A-Za-z0-9]{0,24}") {
            let method = format!("on{first}{rest}");
            let derived = derive_event_name(&method);
            prop_assert_eq!(&derived, &format!("{}{rest}", first.to_lowercase()));
            // Pure and deterministic.
            prop_assert_eq!(derive_event_name(&method), derived);
        }
    }
}
