use super::Engine;

use std::collections::{BTreeMap, HashMap};

use crate::{
    api::TranslationAPI,
    db::OrderStore,
    pricing::{PricingRuleStore, RoutingProvider},
};

impl<R, S, O> TranslationAPI for Engine<R, S, O>
where
    R: RoutingProvider,
    S: PricingRuleStore,
    O: OrderStore,
{
    fn translate(&self, locale: &str, key: &str, options: &HashMap<String, String>) -> String {
        self.catalog.translate(locale, key, options)
    }

    fn supported_languages(&self) -> BTreeMap<String, String> {
        self.catalog.supported_languages()
    }
}
