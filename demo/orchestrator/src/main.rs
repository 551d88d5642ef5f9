// Demo Orchestrator - runs sample messages through the connector in stub mode
// No partner endpoint is contacted; stubbed and pre-flight outcomes only.

use std::collections::BTreeSet;

use serde_json::json;

use connector::adapter::ReturnCodePolicy;
use connector::bootstrap::build_registry;
use connector::config::{ConnectorConfig, PartnerConfig};
use connector::transport::TransportConfig;
use connector::{agdref, dna, Message};

fn demo_partner(url: &str) -> PartnerConfig {
    PartnerConfig {
        disabled: false,
        skip_flows: BTreeSet::new(),
        transport: TransportConfig {
            base_url: url.to_string(),
            method: "POST".to_string(),
            timeout_seconds: 5,
            proxy: None,
            credentials: None,
        },
        codes: ReturnCodePolicy::default(),
    }
}

fn demo_messages() -> Vec<Message> {
    vec![
        Message::new(
            agdref::IDENTIFIER_REQUEST,
            json!({
                "fake_partner": true,
                "nom": "Ndiaye",
                "prenom": "Awa",
                "date_naissance": "19900415",
                "pays_naissance": "Sénégal",
                "nationalite": "SEN",
            }),
        ),
        // No foreigner identifier yet: stays deferred until one is allocated
        Message::new(
            agdref::CLAIM_REGISTRATION,
            json!({"nom": "Ndiaye", "procedure": "N", "date_depot": "20240516"}),
        ),
        // Closed claims never reach the reception system
        Message::new(
            dna::CLAIM_UPDATE,
            json!({"id_demande": "D-2024-0042", "nom": "Ndiaye", "etat_demande": "CLOTUREE"}),
        ),
        Message::new("handler_nobody_registered", json!({})),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ConnectorConfig {
        stub_mode: true,
        agdref: demo_partner("http://localhost:18080/agdref"),
        dna: demo_partner("http://localhost:18080/dna"),
    };

    let registry = build_registry(&config)?;

    println!(
        "🚀 Connector demo - {} processors registered",
        registry.len()
    );
    for name in registry.names() {
        println!("   - {name}");
    }

    for message in demo_messages() {
        println!("\n💬 Message {} -> {}", message.id, message.handler);
        match registry.dispatch(&message).await {
            Ok(report) => println!("   ✅ delivered: {report}"),
            Err(e) => println!("   ⚠️  {:?}: {e}", e.disposition()),
        }
    }

    Ok(())
}
