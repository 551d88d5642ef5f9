//! Foreigner-registry (AGDREF) partner flows
//!
//! Two flows talk to the registry: flux 14 asks it to allocate the national
//! foreigner identifier, flux 15 registers the asylum claim against that
//! identifier. Both share the envelope skeleton; the registry mirrors it
//! back with a `codeErreur` return code.

use crate::adapter::FlowHandler;
use crate::error::{DeliveryError, Result};
use crate::soap::{fold_text, PartnerResponse, RequestEnvelope, ALPHA_UPPER};
use crate::types::Message;

/// Handler name for the identifier-allocation flow
pub const IDENTIFIER_REQUEST: &str = "agdref_demande_numero";

/// Handler name for the claim-registration flow
pub const CLAIM_REGISTRATION: &str = "agdref_enregistrement_demande";

const NAME_MAX: usize = 36;
const PLACE_MAX: usize = 28;

/// Requests allocation of the foreigner identifier (flux 14)
pub struct IdentifierRequestFlow;

impl FlowHandler for IdentifierRequestFlow {
    fn name(&self) -> &str {
        IDENTIFIER_REQUEST
    }

    fn build(&self, message: &Message) -> Result<String> {
        RequestEnvelope::new("demandeNumeroRequest", "14", message.queued_at)
            .field(
                "nomRessortissantEtranger",
                fold_text(message.context_str("nom")?, NAME_MAX, Some(ALPHA_UPPER)),
            )
            .field(
                "prenomRessortissantEtranger",
                fold_text(message.context_str("prenom")?, NAME_MAX, Some(ALPHA_UPPER)),
            )
            .field("dateNaissance", message.context_str("date_naissance")?)
            .field(
                "paysNaissance",
                fold_text(
                    message.context_str("pays_naissance")?,
                    PLACE_MAX,
                    Some(ALPHA_UPPER),
                ),
            )
            .field(
                "nationalite",
                fold_text(message.context_str("nationalite")?, 3, None),
            )
            .field("typeDemande", "ASILE")
            .to_xml()
    }

    fn success_report(&self, response: &PartnerResponse) -> Option<String> {
        response
            .field("numeroRessortissantEtranger")
            .map(|number| format!("foreigner identifier {number} allocated"))
    }
}

/// Registers the asylum claim against an allocated identifier (flux 15)
pub struct ClaimRegistrationFlow;

impl FlowHandler for ClaimRegistrationFlow {
    fn name(&self) -> &str {
        CLAIM_REGISTRATION
    }

    fn build(&self, message: &Message) -> Result<String> {
        // The identifier is allocated by the registry itself, in response to
        // flux 14. Until that response has been recorded the claim is not
        // ready to go out.
        let number = message
            .context_str_opt("numero_etranger")
            .ok_or_else(|| {
                DeliveryError::Wait("foreigner identifier not allocated yet".to_string())
            })?;

        RequestEnvelope::new("enregistrementDemandeRequest", "15", message.queued_at)
            .field("numeroRessortissantEtranger", number)
            .field(
                "nomRessortissantEtranger",
                fold_text(message.context_str("nom")?, NAME_MAX, Some(ALPHA_UPPER)),
            )
            .field(
                "typeProcedure",
                fold_text(message.context_str("procedure")?, 1, None),
            )
            .field("dateDepotDemande", message.context_str("date_depot")?)
            .to_xml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    fn identifier_message() -> Message {
        Message::new(
            IDENTIFIER_REQUEST,
            json!({
                "nom": "Ndiaye",
                "prenom": "Awa",
                "date_naissance": "19900415",
                "pays_naissance": "Sénégal",
                "nationalite": "SEN",
            }),
        )
        .with_queued_at(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap())
    }

    #[test]
    fn test_identifier_request_payload() {
        let xml = IdentifierRequestFlow.build(&identifier_message()).unwrap();

        assert!(xml.contains("<typeFlux>14</typeFlux>"));
        assert!(xml.contains("<dateEmissionFlux>20240517</dateEmissionFlux>"));
        assert!(xml.contains("<nomRessortissantEtranger>NDIAYE</nomRessortissantEtranger>"));
        assert!(xml.contains("<paysNaissance>SENEGAL</paysNaissance>"));
        assert!(xml.contains("<typeDemande>ASILE</typeDemande>"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let msg = identifier_message();
        assert_eq!(
            IdentifierRequestFlow.build(&msg).unwrap(),
            IdentifierRequestFlow.build(&msg).unwrap()
        );
    }

    #[test]
    fn test_identifier_request_missing_field() {
        let msg = Message::new(IDENTIFIER_REQUEST, json!({"nom": "Ndiaye"}));
        let err = IdentifierRequestFlow.build(&msg).unwrap_err();
        assert!(matches!(err, DeliveryError::Configuration(_)));
    }

    #[test]
    fn test_claim_registration_waits_for_the_identifier() {
        let msg = Message::new(
            CLAIM_REGISTRATION,
            json!({"nom": "Ndiaye", "procedure": "N", "date_depot": "20240516"}),
        );

        let err = ClaimRegistrationFlow.build(&msg).unwrap_err();
        assert!(matches!(err, DeliveryError::Wait(_)));
    }

    #[test]
    fn test_claim_registration_payload() {
        let msg = Message::new(
            CLAIM_REGISTRATION,
            json!({
                "numero_etranger": "7503012345",
                "nom": "Ndiaye",
                "procedure": "N",
                "date_depot": "20240516",
            }),
        )
        .with_queued_at(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap());

        let xml = ClaimRegistrationFlow.build(&msg).unwrap();
        assert!(xml.contains("<typeFlux>15</typeFlux>"));
        assert!(xml.contains(
            "<numeroRessortissantEtranger>7503012345</numeroRessortissantEtranger>"
        ));
        assert!(xml.contains("<typeProcedure>N</typeProcedure>"));
    }

    #[test]
    fn test_identifier_success_report() {
        let body = "<reponse><codeErreur>000</codeErreur>\
                    <numeroRessortissantEtranger>7503012345</numeroRessortissantEtranger></reponse>";
        let parsed = crate::soap::parse_partner_response(body).unwrap();

        let report = IdentifierRequestFlow.success_report(&parsed).unwrap();
        assert!(report.contains("7503012345"));
    }
}
