//! `qSupported`, `qXfer:memory-map:read`, and `vContSupported?` handlers
//! (spec §4.4, §6).

use crate::protocol::response::Response;
use crate::session::NegotiatedFeature;

use super::{HandlerContext, SERVER_FEATURES};

const DEFAULT_PACKET_SIZE: u32 = 4096;

fn feature_offered(client_features: &[(String, Option<String>)], name: &str) -> bool {
    client_features
        .iter()
        .any(|(feature, value)| feature == name && value.as_deref() != Some("-"))
}

/// Intersects the client's advertised features with the server's
/// capability set. Fails closed (spec §4.4) if the client advertises
/// neither software- nor hardware-breakpoints.
pub fn supported(ctx: &mut HandlerContext<'_>, client_features: &[(String, Option<String>)]) -> Response {
    if !feature_offered(client_features, "swbreak") && !feature_offered(client_features, "hwbreak") {
        return Response::Error(
            crate::error::CoreError::ClientNotSupported(
                "client advertises neither swbreak nor hwbreak".into(),
            )
            .rsp_error_code(),
        );
    }

    let mut negotiated: Vec<NegotiatedFeature> = Vec::new();
    let mut reply_terms = Vec::new();

    for &feature in SERVER_FEATURES {
        negotiated.push(NegotiatedFeature {
            name: feature.to_string(),
            value: None,
        });
        reply_terms.push(format!("{feature}+"));
    }

    if ctx.config.range_stepping_enabled {
        reply_terms.push("vContSupported+".to_string());
    }
    if feature_offered(client_features, "QStartNoAckMode") {
        reply_terms.push("QStartNoAckMode+".to_string());
    }
    reply_terms.push(format!("PacketSize={DEFAULT_PACKET_SIZE:x}"));

    ctx.session.negotiated_features = negotiated;

    Response::Text(reply_terms.join(";"))
}

pub fn memory_map(ctx: &mut HandlerContext<'_>, offset: u64, length: u64) -> Response {
    let xml = memory_map_xml(ctx);
    let bytes = xml.into_bytes();
    let start = (offset as usize).min(bytes.len());
    let end = (start + length as usize).min(bytes.len());
    let chunk = &bytes[start..end];
    let more = end < bytes.len();
    let marker = if more { "m" } else { "l" };
    Response::Text(format!("{marker}{}", String::from_utf8_lossy(chunk)))
}

fn memory_map_xml(ctx: &HandlerContext<'_>) -> String {
    match ctx.architecture {
        crate::regmap::Architecture::Avr => {
            "<memory-map><memory type=\"flash\" start=\"0x0\" length=\"0x20000\"/>\
             <memory type=\"ram\" start=\"0x800000\" length=\"0x2000\"/></memory-map>"
                .to_string()
        }
        crate::regmap::Architecture::RiscV32 => {
            "<memory-map><memory type=\"ram\" start=\"0x0\" length=\"0x100000000\"/></memory-map>"
                .to_string()
        }
    }
}

pub fn vcont_supported(ctx: &mut HandlerContext<'_>) -> Response {
    let mut actions = vec!["c", "C", "s", "S"];
    if ctx.config.range_stepping_enabled {
        actions.push("r");
    }
    Response::Text(format!("vCont;{}", actions.join(";")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_offered_ignores_declined_features() {
        let features = vec![("swbreak".to_string(), Some("-".to_string()))];
        assert!(!feature_offered(&features, "swbreak"));
    }

    #[test]
    fn feature_offered_detects_plus_suffixed_feature() {
        let features = vec![("hwbreak".to_string(), None)];
        assert!(feature_offered(&features, "hwbreak"));
    }
}
