//! Source labware check for liquid transfer steps.
//!
//! The transfer script named on a liquid-transfer step encodes the source
//! plate type it was calibrated for. Running it against a different labware
//! ruins the transfer, so a mismatch must stop the run.

use tracing::{debug, error};

use plateflow_core::{Carrier, LabwareRule, ParamValue, ValidatorConfig};

use crate::error::{AdjustError, AdjustResult};

/// Check one carrier's pending transfer steps against `config.rules`.
pub fn validate_carrier(carrier: &Carrier, config: &ValidatorConfig) -> AdjustResult<()> {
    let step_needle = config.step_contains.to_uppercase();
    let labware = carrier.labware.to_uppercase();

    for op in carrier
        .pending
        .iter()
        .filter(|op| op.name.to_uppercase().contains(&step_needle))
    {
        let Some(script) = op.param(&config.parameter).map(ParamValue::to_string) else {
            debug!(carrier = %carrier.key(), operation = %op.name, "no script name, skipping");
            continue;
        };
        if let Some(rule) = violated_rule(&config.rules, &script, &labware) {
            error!(
                carrier = %carrier.key(),
                operation = %op.name,
                script = %script,
                labware = %carrier.labware,
                "source labware does not match transfer script"
            );
            return Err(AdjustError::LabwareMismatch {
                carrier: carrier.key(),
                operation: op.name.clone(),
                token: rule.script_token.clone(),
                script,
                labware: carrier.labware.clone(),
            });
        }
    }
    Ok(())
}

/// Check every carrier of a lane; the first mismatch wins.
pub fn validate_lane(carriers: &[Carrier], config: &ValidatorConfig) -> AdjustResult<()> {
    carriers
        .iter()
        .try_for_each(|carrier| validate_carrier(carrier, config))
}

fn violated_rule<'a>(
    rules: &'a [LabwareRule],
    script: &str,
    labware_upper: &str,
) -> Option<&'a LabwareRule> {
    rules.iter().find(|rule| {
        script.contains(&rule.script_token)
            && !labware_upper.contains(&rule.labware_contains.to_uppercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateflow_core::{LaneId, Operation, Slot};

    fn carrier(ordinal: u32, labware: &str, script: Option<&str>) -> Carrier {
        let mut transfer = Operation::new("Echo LiquidTransfer");
        if let Some(script) = script {
            transfer.set_param("Script Name", script);
        }
        Carrier {
            ordinal,
            lane: LaneId::new("source"),
            slot: Slot::new("Hotel 1", 1, ordinal),
            labware: labware.to_string(),
            pending: vec![Operation::new("Move to Echo"), transfer],
        }
    }

    #[test]
    fn matching_labware_passes() {
        let config = ValidatorConfig::default();
        assert!(validate_carrier(&carrier(1, "Labcyte_Polypropylene_384", Some("384PP_DMSO")), &config).is_ok());
        assert!(validate_carrier(&carrier(2, "labcyte_diamond_1536", Some("1536LDV_AQ")), &config).is_ok());
    }

    #[test]
    fn pp_script_on_wrong_labware_fails() {
        let err = validate_carrier(
            &carrier(3, "Greiner_384_PS", Some("384PP_DMSO")),
            &ValidatorConfig::default(),
        )
        .unwrap_err();

        assert!(err.is_fatal());
        match err {
            AdjustError::LabwareMismatch { carrier, token, script, labware, .. } => {
                assert_eq!(carrier.ordinal, 3);
                assert_eq!(token, "PP");
                assert_eq!(script, "384PP_DMSO");
                assert_eq!(labware, "Greiner_384_PS");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ldv_script_on_pp_labware_fails() {
        let err = validate_carrier(
            &carrier(1, "Labcyte_Polypropylene_384", Some("1536LDV_DMSO")),
            &ValidatorConfig::default(),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("LDV source (1536LDV_DMSO)"));
        assert!(message.contains("Labcyte_Polypropylene_384"));
    }

    #[test]
    fn steps_without_script_are_skipped() {
        let config = ValidatorConfig::default();
        assert!(validate_carrier(&carrier(1, "anything", None), &config).is_ok());
    }

    #[test]
    fn unrelated_steps_are_ignored() {
        let mut c = carrier(1, "Greiner_384", None);
        c.pending = vec![Operation::new("Plate Seal").with_param("Script Name", "PP")];
        assert!(validate_carrier(&c, &ValidatorConfig::default()).is_ok());
    }

    #[test]
    fn lane_reports_first_mismatch() {
        let carriers = vec![
            carrier(1, "Labcyte_Polypropylene_384", Some("384PP_DMSO")),
            carrier(2, "Greiner_384", Some("384PP_DMSO")),
            carrier(3, "Greiner_1536", Some("1536LDV_DMSO")),
        ];
        let err = validate_lane(&carriers, &ValidatorConfig::default()).unwrap_err();
        assert!(matches!(err, AdjustError::LabwareMismatch { ref carrier, .. } if carrier.ordinal == 2));
    }
}
