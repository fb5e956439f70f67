mod backend;
mod structural;
mod ux;

use crate::Rule;

/// All rules the validator runs, in the order `spec.md` §4.3 lists them.
/// Order here only affects which rule constructs a diagnostic first;
/// [`air_diagnostics::sort_diagnostics`] is what fixes the final order.
#[must_use]
pub fn build_registry() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(structural::AppNamePresent),
        Box::new(structural::UiBlockPresent),
        Box::new(backend::ApiModelExists),
        Box::new(ux::NoDuplicatePages),
        Box::new(ux::NavTargetsExist),
        Box::new(backend::CrudModelExists),
        Box::new(structural::StateBlockPresent),
        Box::new(backend::DbWithoutApi),
        Box::new(backend::AmbiguousRelation),
        Box::new(ux::StateFieldsRendered),
        Box::new(ux::AuthLookingRouteHasAuth),
        Box::new(backend::ModelHasPrimaryKey),
        Box::new(ux::AuthRequiredHasLoginRoute),
        Box::new(ux::StateWithoutPersist),
        Box::new(structural::StyleBlockPresent),
    ]
}
