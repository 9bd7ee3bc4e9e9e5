//! Prompt construction
//!
//! The per-phase instruction table is indexed by `Phase::index()`, so a new
//! phase without an instruction fails to compile.

use archpro_utils::types::Phase;
use strum::EnumCount;

const PHASE_INSTRUCTIONS: [&str; Phase::COUNT] = [
    // Requirements
    "Discuss functional and non-functional requirements, including a 99.99% availability \
     target. Perform detailed capacity planning.",
    // High Level Design
    "Provide a structured component breakdown and request flow. Use terms like fan-out, \
     back-pressure and CQRS.",
    // Data Model & APIs
    "Provide schemas for both SQL and NoSQL stores, and the API surface.",
    // Low Level Design
    "Write production-ready Java code snippets using named design patterns.",
    // Machine Coding
    "Frame this as a 2-hour session to build a working application. Focus on the class \
     diagram, design patterns (such as Strategy or Factory) and concurrency handling. \
     Emphasize extensibility and clean code.",
    // Deep Dives & Scaling
    "Focus on common tasks such as a Kafka-backed order event processor. Discuss consistency \
     vs. latency trade-offs, handling 200k+ events/min with strict ordering, Kafka \
     partitioning, Redis caching and idempotency in depth.",
    // Interview Follow-ups
    "Provide senior-level trade-off thinking for likely follow-up questions.",
];

/// Instruction for `phase`.
#[must_use]
pub fn phase_instruction(phase: Phase) -> &'static str {
    PHASE_INSTRUCTIONS[phase.index()]
}

#[must_use]
pub fn section_prompt(topic_name: &str, phase: Phase, context: &str) -> String {
    format!(
        "You are an expert Staff Software Engineer (SDE-3) and Software Architect at a Big Tech company.\n\
         Create a deep, insightful design for: {topic_name}\n\
         Focus specifically on the phase: {phase}\n\
         \n\
         Context: {context}\n\
         \n\
         Guidelines: {instruction}\n\
         \n\
         Format the response in professional Markdown.",
        phase = phase.label(),
        instruction = phase_instruction(phase),
    )
}

#[must_use]
pub fn diagram_prompt(topic_name: &str) -> String {
    format!(
        "Create an advanced Mermaid.js graph for the high-level architecture of {topic_name}.\n\
         Include CDN, DNS, API Gateway, Load Balancers, Microservices, Databases, Message Queues and Cache.\n\
         ONLY return the mermaid code starting with \"graph TD\"."
    )
}

#[must_use]
pub fn cover_prompt(topic_name: &str) -> String {
    format!(
        "A futuristic, professional technical blog header image representing \
         '{topic_name} System Architecture'. Dark mode aesthetic, minimalist nodes and connections."
    )
}

#[must_use]
pub fn video_prompt(topic_name: &str) -> String {
    format!(
        "Cinematic visualization of a cloud architecture for {topic_name}. \
         High quality 3D rendering."
    )
}

/// Remove Markdown code fences (```` ```mermaid ```` / ```` ``` ````) and trim.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```mermaid", "").replace("```", "").trim().to_string()
}
