//! Static fallback content
//!
//! Pre-written sections keyed by (topic, phase) and diagrams keyed by topic.
//! Most pairs have no entry; absence means "no content available" and is
//! never an error. Lookups are exact: an entry for one phase is never
//! served for another.

use std::collections::HashMap;

use archpro_utils::types::Phase;

/// Immutable fallback dataset.
#[derive(Debug, Clone, Default)]
pub struct StaticFallbackStore {
    sections: HashMap<String, HashMap<Phase, String>>,
    diagrams: HashMap<String, String>,
}

impl StaticFallbackStore {
    /// A store with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> StaticFallbackStoreBuilder {
        StaticFallbackStoreBuilder::default()
    }

    /// The bundled dataset.
    #[must_use]
    pub fn builtin() -> Self {
        let mut builder = Self::builder();
        for (topic_id, phase, text) in BUILTIN_SECTIONS {
            builder = builder.section(*topic_id, *phase, *text);
        }
        for (topic_id, text) in BUILTIN_DIAGRAMS {
            builder = builder.diagram(*topic_id, *text);
        }
        builder.build()
    }

    #[must_use]
    pub fn section(&self, topic_id: &str, phase: Phase) -> Option<&str> {
        self.sections
            .get(topic_id)
            .and_then(|phases| phases.get(&phase))
            .map(String::as_str)
    }

    #[must_use]
    pub fn diagram(&self, topic_id: &str) -> Option<&str> {
        self.diagrams.get(topic_id).map(String::as_str)
    }

    /// Phases with a section entry for `topic_id`, in phase order.
    #[must_use]
    pub fn covered_phases(&self, topic_id: &str) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|phase| self.section(topic_id, *phase).is_some())
            .collect()
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }
}

/// Builder for injected datasets.
#[derive(Debug, Default)]
pub struct StaticFallbackStoreBuilder {
    store: StaticFallbackStore,
}

impl StaticFallbackStoreBuilder {
    /// Add or replace the section for (topic, phase).
    #[must_use]
    pub fn section(
        mut self,
        topic_id: impl Into<String>,
        phase: Phase,
        text: impl Into<String>,
    ) -> Self {
        self.store
            .sections
            .entry(topic_id.into())
            .or_default()
            .insert(phase, text.into());
        self
    }

    /// Add or replace the diagram for a topic.
    #[must_use]
    pub fn diagram(mut self, topic_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.store.diagrams.insert(topic_id.into(), text.into());
        self
    }

    #[must_use]
    pub fn build(self) -> StaticFallbackStore {
        self.store
    }
}

const UBER_REQUIREMENTS: &str = "# Uber System Design Requirements
### Functional Requirements
- **User Side**: View nearby drivers, request a ride, track driver location, pay for ride.
- **Driver Side**: Accept/Reject rides, update status.

### Non-Functional Requirements
- **Low Latency**: Location updates must be real-time (<200ms).
- **High Availability**: 99.99% uptime.";

const UBER_MACHINE_CODING: &str = "## The Machine Coding (The \"Craft\" Test)
- **Format**: 2-hour session to build a working application.
- **What is assessed**: Not just the output. Reviewers read the class diagram, the design patterns (Strategy, Factory) and how concurrency is handled.

### Task: Driver Matching Engine
Implement a system where a rider's location is matched to the nearest available driver using a Euclidean distance strategy.";

const UBER_DEEP_DIVES: &str = "## Deep Dives & Scaling
### Common Task: Design a Kafka-backed Order Event Processor
- **What is assessed**: Consistency vs. latency trade-offs. Handling 200k events/min with strict ordering requires Kafka partitioning, Redis caching and idempotency.

### Geo-Sharding with Kafka
Partition the Kafka topic by region id. All events for one city land on one partition and are consumed in order by the same consumer group, preserving the sequence of ride status updates.";

const PARKING_LOT_REQUIREMENTS: &str = "# Parking Lot Requirements
- Support multiple vehicle types (Car, Bike, Truck).
- Support multiple levels/floors.
- Automated ticketing and payment calculation based on duration.";

const PARKING_LOT_MACHINE_CODING: &str = "## The Machine Coding (The \"Craft\" Test)
- **Format**: Build a working application in 2 hours.
- **What is assessed**: Class diagrams must show inheritance and interfaces clearly.

### Java Implementation Strategy
Use the **Factory Pattern** for vehicle creation and the **Singleton Pattern** for the Parking Manager.";

const PARKING_LOT_LOW_LEVEL_DESIGN: &str = "```java
public abstract class Vehicle {
    private String licensePlate;
    private VehicleType type;
}

public class ParkingLot {
    private List<Level> levels;
    private static ParkingLot instance;

    public synchronized Ticket parkVehicle(Vehicle v) {
        // synchronized: one slot assignment at a time
    }
}
```";

const SPLITWISE_MACHINE_CODING: &str = "## The Machine Coding: Splitwise
- **Task**: Build a system to add expenses and show balances.
- **Pattern**: Use the **Observer Pattern** to notify users of new expenses.
- **Advanced**: Implement \"Simplify Debts\" with a min/max heap to reduce the number of transactions.";

const SPLITWISE_DEEP_DIVES: &str = "### Common Task: Transaction Event Processor
Handle 200k balance updates per minute through Kafka so that group balances are updated asynchronously and stay eventually consistent.";

const SNAKE_LADDER_MACHINE_CODING: &str = "## The Machine Coding: Snake & Ladder
- **Format**: Build the game logic for multiple players.
- **What is assessed**: Clean code and extensibility. How easily can a \"Super Snake\" or a \"Magic Portal\" be added?
- **Design**: A single **Jump interface** for both snakes and ladders keeps the code DRY.";

const BUILTIN_SECTIONS: &[(&str, Phase, &str)] = &[
    ("uber", Phase::Requirements, UBER_REQUIREMENTS),
    ("uber", Phase::MachineCoding, UBER_MACHINE_CODING),
    ("uber", Phase::DeepDivesScaling, UBER_DEEP_DIVES),
    ("parking-lot", Phase::Requirements, PARKING_LOT_REQUIREMENTS),
    ("parking-lot", Phase::MachineCoding, PARKING_LOT_MACHINE_CODING),
    ("parking-lot", Phase::LowLevelDesign, PARKING_LOT_LOW_LEVEL_DESIGN),
    ("splitwise", Phase::MachineCoding, SPLITWISE_MACHINE_CODING),
    ("splitwise", Phase::DeepDivesScaling, SPLITWISE_DEEP_DIVES),
    ("snake-ladder", Phase::MachineCoding, SNAKE_LADDER_MACHINE_CODING),
];

const BUILTIN_DIAGRAMS: &[(&str, &str)] = &[
    (
        "uber",
        "graph TD
    R[Rider App] --> AG[API Gateway]
    AG --> KS[Kafka Stream]
    KS --> TS[Trip Service]
    TS --> DB[(PostgreSQL)]",
    ),
    (
        "parking-lot",
        "graph TD
    E[Entrance] --> TM[Ticket Manager]
    TM --> S[Slot Search]
    S --> L1[Level 1]
    S --> L2[Level 2]",
    ),
    (
        "splitwise",
        "graph TD
    U[User] --> ES[Expense Service]
    ES --> K[Kafka Topic]
    K --> AS[Async Balance Settler]
    AS --> DB[(NoSQL Balances)]",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_coverage() {
        let store = StaticFallbackStore::builtin();
        assert_eq!(store.section_count(), 9);
        assert_eq!(store.diagram_count(), 3);
        assert_eq!(
            store.covered_phases("uber"),
            vec![
                Phase::Requirements,
                Phase::MachineCoding,
                Phase::DeepDivesScaling
            ]
        );
        assert_eq!(
            store.covered_phases("snake-ladder"),
            vec![Phase::MachineCoding]
        );
        assert!(store.covered_phases("spotify").is_empty());
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = StaticFallbackStore::builtin();
        assert!(
            store
                .section("uber", Phase::Requirements)
                .unwrap()
                .starts_with("# Uber System Design Requirements")
        );
        assert!(store.section("uber", Phase::HighLevelDesign).is_none());
        assert!(store.section("parking-lot", Phase::HighLevelDesign).is_none());
        assert!(store.section("unknown", Phase::Requirements).is_none());
        assert!(store.diagram("uber").unwrap().starts_with("graph TD"));
        assert!(store.diagram("snake-ladder").is_none());
    }

    #[test]
    fn test_builder_injects_dataset() {
        let store = StaticFallbackStore::builder()
            .section("t", Phase::MachineCoding, "mc")
            .section("t", Phase::MachineCoding, "mc2")
            .diagram("t", "graph TD\n  X --> Y")
            .build();
        assert_eq!(store.section("t", Phase::MachineCoding), Some("mc2"));
        assert_eq!(store.section("t", Phase::Requirements), None);
        assert_eq!(store.diagram("t"), Some("graph TD\n  X --> Y"));
        assert_eq!(store.section_count(), 1);
    }

    #[test]
    fn test_empty_store() {
        let store = StaticFallbackStore::empty();
        assert_eq!(store.section_count(), 0);
        assert!(store.diagram("uber").is_none());
    }
}
