//! A small slice of EFO shaped like the real service data.
//!
//! `asthma` carries a three-level chain; `allergic asthma` and `eczema` are
//! extra search noise; `Crohn disease` lives in the MONDO namespace so its
//! IRI does not share the EFO prefix.

use std::sync::Arc;

use efo_core::config::OlsConfig;
use efo_core::OntologyLookup;
use efo_ols::OlsClient;

use super::builders::TermFixture;
use super::fake_ols_api::FakeOlsApi;

pub const ASTHMA_IRI: &str = "http://www.ebi.ac.uk/efo/EFO_0000270";
pub const CROHN_IRI: &str = "http://purl.obolibrary.org/obo/MONDO_0005011";

pub fn asthma() -> TermFixture {
    TermFixture::efo("asthma", "EFO_0000270")
        .description("A bronchial disease characterized by chronic inflammation.")
}

pub fn allergic_asthma() -> TermFixture {
    TermFixture::efo("allergic asthma", "EFO_0000274")
}

pub fn eczema() -> TermFixture {
    TermFixture::efo("eczema", "HP_0000964")
}

pub fn crohn() -> TermFixture {
    TermFixture::mondo("Crohn disease", "MONDO_0005011")
}

pub fn asthma_chain() -> Vec<TermFixture> {
    vec![
        TermFixture::efo("respiratory system disease", "EFO_0000684"),
        TermFixture::efo("disease", "EFO_0000408"),
        TermFixture::efo("disease or disorder", "EFO_0000000").without_obo_id(),
    ]
}

pub fn crohn_chain() -> Vec<TermFixture> {
    vec![
        TermFixture::mondo("inflammatory bowel disease", "MONDO_0005265"),
        TermFixture::efo("disease", "EFO_0000408"),
    ]
}

/// Start a fake service populated with the fixture ontology.
pub async fn seeded_api() -> FakeOlsApi {
    let api = FakeOlsApi::start().await.expect("fake OLS api starts");
    api.add_term_with_ancestors(asthma(), asthma_chain()).await;
    api.add_term_with_ancestors(allergic_asthma(), vec![]).await;
    api.add_term(eczema()).await;
    api.add_term_with_ancestors(crohn(), crohn_chain()).await;
    api
}

pub fn ols_config(base_url: &str) -> OlsConfig {
    OlsConfig {
        base_url: base_url.to_string(),
        ontology: "efo".to_string(),
        timeout_secs: 5,
        rows: 10,
    }
}

pub fn client_for(api: &FakeOlsApi) -> Arc<dyn OntologyLookup> {
    Arc::new(OlsClient::new(&ols_config(&api.base_url())).expect("client builds"))
}
