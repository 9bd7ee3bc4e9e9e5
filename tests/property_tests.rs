//! Property tests over the public surface

use std::sync::Arc;

use proptest::prelude::*;

use archpro::{Phase, Studio};
use archpro_config::credential::{MIN_CREDENTIAL_LEN, is_usable_credential};
use archpro_content::TopicCatalog;
use archpro_engine::presentation::{BLOG_SECTION_SEPARATOR, blog_body};
use archpro_llm::test_support::ScriptedCapability;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_short_credentials_are_unusable(value in ".{0,5}") {
        prop_assume!(value.chars().count() < MIN_CREDENTIAL_LEN);
        prop_assert!(!is_usable_credential(&value));
    }

    #[test]
    fn prop_long_credentials_are_usable(value in "[A-Za-z0-9_-]{6,64}") {
        prop_assume!(value != "undefined");
        prop_assert!(is_usable_credential(&value));
    }

    #[test]
    fn prop_blog_order_independent_of_generation_order(
        order in Just(Phase::ALL.to_vec()).prop_shuffle(),
        keep in 1..=Phase::ALL.len(),
    ) {
        let generated: Vec<Phase> = order.into_iter().take(keep).collect();
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = Studio::new(scripted.clone());
        let topic = TopicCatalog::builtin().get("splitwise").cloned().unwrap();

        runtime().block_on(async {
            for phase in &generated {
                studio.ensure_content(&topic, *phase).await;
            }
        });

        let expected: Vec<String> = Phase::ALL
            .into_iter()
            .filter(|phase| generated.contains(phase))
            .map(|phase| format!("splitwise/{} section", phase.slug()))
            .collect();
        prop_assert_eq!(blog_body(&studio, "splitwise"), expected.join(BLOG_SECTION_SEPARATOR));
        prop_assert_eq!(scripted.section_calls(), generated.len());
        prop_assert_eq!(scripted.cover_calls(), 1);
    }

    #[test]
    fn prop_repeated_requests_generate_each_section_once(
        requests in proptest::collection::vec(proptest::sample::select(Phase::ALL.to_vec()), 1..20),
    ) {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = Studio::new(scripted.clone());
        let topic = TopicCatalog::builtin().get("ticketmaster").cloned().unwrap();

        runtime().block_on(async {
            for phase in &requests {
                studio.ensure_content(&topic, *phase).await;
            }
        });

        let mut distinct = requests.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(scripted.section_calls(), distinct.len());
        let expected_diagrams = usize::from(distinct.contains(&Phase::HighLevelDesign));
        prop_assert_eq!(scripted.diagram_calls(), expected_diagrams);
    }
}
