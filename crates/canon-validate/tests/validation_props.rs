mod common;

use canon_core::ValidationStatus;
use canon_validate::{validate_parameter, Policy};
use proptest::prelude::*;

use common::{exact, measured, parameter};

proptest! {
    #[test]
    fn exact_mismatch_always_fails(reference in -1.0e6f64..1.0e6, delta in prop_oneof![-1.0f64..-1e-9, 1e-9f64..1.0]) {
        let mut p = parameter("x", reference + delta);
        p.experimental = Some(exact(reference));
        let record = validate_parameter(&p, &Policy::default()).unwrap();
        if p.value == reference {
            prop_assert_eq!(record.status, ValidationStatus::Pass);
        } else {
            prop_assert_eq!(record.status, ValidationStatus::Fail);
        }
    }

    #[test]
    fn sigma_verdicts_are_monotone(offset in 0.0f64..10.0, uncertainty in 0.01f64..5.0) {
        let policy = Policy::default();
        let mut p = parameter("x", 100.0 + offset * uncertainty);
        p.experimental = Some(measured(100.0, Some(uncertainty)));
        let record = validate_parameter(&p, &policy).unwrap();
        let sigma = (p.value - 100.0).abs() / uncertainty;
        let expected = if sigma <= 2.0 {
            ValidationStatus::Pass
        } else if sigma <= 5.0 {
            ValidationStatus::Check
        } else {
            ValidationStatus::Fail
        };
        prop_assert_eq!(record.status, expected);
        prop_assert_eq!(record.clone(), validate_parameter(&p, &policy).unwrap());
    }
}
