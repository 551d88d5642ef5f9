//! Start-up wiring: configuration to processor registry

use std::sync::Arc;

use tracing::info;

use crate::adapter::{FlowHandler, FlowSwitches, PartnerAdapter};
use crate::agdref;
use crate::config::{ConnectorConfig, PartnerConfig};
use crate::dna;
use crate::error::Result;
use crate::registry::ProcessorRegistry;
use crate::transport::Transport;

/// Build the processor registry from configuration.
///
/// Registration happens here and only here; dispatching workers treat the
/// returned registry as read-only. Callers may register additional simple
/// processors before handing the registry out.
pub fn build_registry(config: &ConnectorConfig) -> Result<ProcessorRegistry> {
    let mut registry = ProcessorRegistry::new();

    register_partner_flows(
        &mut registry,
        &config.agdref,
        config.stub_mode,
        vec![
            Arc::new(agdref::IdentifierRequestFlow) as Arc<dyn FlowHandler>,
            Arc::new(agdref::ClaimRegistrationFlow),
        ],
    )?;

    register_partner_flows(
        &mut registry,
        &config.dna,
        config.stub_mode,
        vec![Arc::new(dna::ClaimUpdateFlow) as Arc<dyn FlowHandler>],
    )?;

    info!("processor registry ready: {:?}", registry.names());
    Ok(registry)
}

fn register_partner_flows(
    registry: &mut ProcessorRegistry,
    partner: &PartnerConfig,
    stub_mode: bool,
    flows: Vec<Arc<dyn FlowHandler>>,
) -> Result<()> {
    // One client per partner; flows of a partner share endpoint and timeout
    let transport = Arc::new(Transport::new(partner.transport.clone())?);

    for flow in flows {
        let switches = FlowSwitches {
            skip: partner.skip_flows.contains(flow.name()),
            disabled: partner.disabled,
            stub_mode,
        };
        let adapter = PartnerAdapter::new(flow, transport.clone(), switches, partner.codes.clone());
        registry.register(adapter.name().to_string(), Arc::new(adapter));
    }

    Ok(())
}
