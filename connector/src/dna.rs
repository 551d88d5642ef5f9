//! Reception-system (DNA) partner flows
//!
//! The reception system only needs to track live claims, so updates for
//! closed claims are skipped outright instead of being sent and rejected.

use crate::adapter::FlowHandler;
use crate::error::{DeliveryError, Result};
use crate::soap::{self, fold_text, RequestEnvelope, ALPHA_UPPER};
use crate::types::Message;

/// Handler name for the claim-update flow
pub const CLAIM_UPDATE: &str = "dna_maj_demande";

const NAME_MAX: usize = 36;
const STATE_MAX: usize = 16;

/// Pushes asylum-claim updates to the reception system
pub struct ClaimUpdateFlow;

impl FlowHandler for ClaimUpdateFlow {
    fn name(&self) -> &str {
        CLAIM_UPDATE
    }

    fn build(&self, message: &Message) -> Result<String> {
        let state = message.context_str("etat_demande")?;
        if state == "CLOTUREE" {
            return Err(DeliveryError::Skip(
                "closed claims are not pushed to the reception system".to_string(),
            ));
        }

        RequestEnvelope::new("majDemandeAsileRequest", "03", message.queued_at)
            .field("idDemandeAsile", message.context_str("id_demande")?)
            .field(
                "nomUsager",
                fold_text(message.context_str("nom")?, NAME_MAX, Some(ALPHA_UPPER)),
            )
            .field("etatDemande", fold_text(state, STATE_MAX, None))
            .field(
                "dateMiseAJour",
                message.queued_at.format(soap::DATE_FORMAT).to_string(),
            )
            .to_xml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claim_update_payload() {
        let msg = Message::new(
            CLAIM_UPDATE,
            json!({"id_demande": "D-2024-0042", "nom": "Hernández", "etat_demande": "EN_COURS"}),
        );

        let xml = ClaimUpdateFlow.build(&msg).unwrap();
        assert!(xml.contains("<typeFlux>03</typeFlux>"));
        assert!(xml.contains("<idDemandeAsile>D-2024-0042</idDemandeAsile>"));
        assert!(xml.contains("<nomUsager>HERNANDEZ</nomUsager>"));
        assert!(xml.contains("<etatDemande>EN_COURS</etatDemande>"));
    }

    #[test]
    fn test_closed_claims_are_skipped() {
        let msg = Message::new(
            CLAIM_UPDATE,
            json!({"id_demande": "D-2024-0042", "nom": "Hernández", "etat_demande": "CLOTUREE"}),
        );

        let err = ClaimUpdateFlow.build(&msg).unwrap_err();
        assert!(matches!(err, DeliveryError::Skip(_)));
    }
}
