use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct Translation {
    locale: String,
    key: String,
    text: String,
}

pub async fn languages(Extension(api): Extension<DynAPI>) -> Json<BTreeMap<String, String>> {
    api.supported_languages().into()
}

pub async fn translate(
    Extension(api): Extension<DynAPI>,
    Path((locale, key)): Path<(String, String)>,
    Query(options): Query<HashMap<String, String>>,
) -> Json<Translation> {
    let text = api.translate(&locale, &key, &options);

    Translation { locale, key, text }.into()
}
