//! Builtin module signatures.
//!
//! The standard effectful modules (`Io`, `Http`, `Sql`, `Time`, `Files`,
//! `Secrets`, `AiModel`) and the PII helpers are known to the checker by
//! signature. `Pii.reveal` is the one place a PII wrapper may legally be
//! dropped.

use aster_common::effect::Effect;
use aster_ir::ir;

/// Signature of a builtin function.
pub struct Builtin {
    pub type_params: Vec<String>,
    pub params: Vec<ir::Type>,
    pub ret: ir::Type,
    pub effects: Vec<Effect>,
}

/// The qualified name of the only PII unwrap site.
pub const PII_REVEAL: &str = "Pii.reveal";

fn text() -> ir::Type {
    ir::Type::name("Text")
}

fn nothing() -> ir::Type {
    ir::Type::name("Nothing")
}

fn tvar(name: &str) -> ir::Type {
    ir::Type::TypeVar {
        name: name.to_string(),
    }
}

fn pii(inner: ir::Type) -> ir::Type {
    ir::Type::Pii {
        item: Box::new(inner),
    }
}

/// Look up a builtin by fully qualified name.
pub fn signature(qualified_name: &str) -> Option<Builtin> {
    let (type_params, params, ret, effects): (Vec<&str>, Vec<ir::Type>, ir::Type, Vec<Effect>) =
        match qualified_name {
            "Io.print" => (vec![], vec![text()], nothing(), vec![Effect::Io]),
            "Io.readLine" => (vec![], vec![], text(), vec![Effect::Io]),
            "Http.get" => (vec![], vec![text()], text(), vec![Effect::Http]),
            "Http.post" => (vec![], vec![text(), text()], text(), vec![Effect::Http]),
            "Sql.query" => (
                vec![],
                vec![text()],
                ir::Type::List {
                    item: Box::new(text()),
                },
                vec![Effect::Sql],
            ),
            "Time.now" => (vec![], vec![], ir::Type::name("DateTime"), vec![Effect::Time]),
            "Files.read" => (vec![], vec![text()], text(), vec![Effect::Files]),
            "Files.write" => (
                vec![],
                vec![text(), text()],
                nothing(),
                vec![Effect::Files],
            ),
            "Secrets.get" => (vec![], vec![text()], pii(text()), vec![Effect::Secrets]),
            "AiModel.complete" => (vec![], vec![text()], text(), vec![Effect::AiModel]),
            "Pii.wrap" => (vec!["T"], vec![tvar("T")], pii(tvar("T")), vec![]),
            "Pii.reveal" => (vec!["T"], vec![pii(tvar("T"))], tvar("T"), vec![]),
            _ => return None,
        };
    Some(Builtin {
        type_params: type_params.into_iter().map(str::to_string).collect(),
        params,
        ret,
        effects,
    })
}
