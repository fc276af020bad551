//! Benchmarks for record ingestion and entity resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use civic_graph::dataset::{Dataset, DatasetShape};
use civic_graph::graph::IncidentGraph;
use civic_graph::ingest::{self, ArrestColumn, Column, MalformedPolicy};
use civic_graph::ontology::{EntityClass, Property};
use civic_graph::value::Value;

/// `rows` arrest rows drawn from a small pool of people and places, so that
/// most resolutions hit existing entities.
fn arrest_dataset(rows: usize) -> Dataset {
    let mut table = vec![ArrestColumn::ALL.iter().map(|c| c.name().to_string()).collect()];
    for i in 0..rows {
        let area = i % 21 + 1;
        table.push(vec![
            i.to_string(),
            "BOOKED".into(),
            "2019-02-09".into(),
            format!("{}", 100 + i % 2300 / 100 * 100),
            area.to_string(),
            format!("Area {area}"),
            format!("{}", area * 100 + i % 7),
            (18 + i % 50).to_string(),
            ["M", "F"][i % 2].into(),
            ["H", "W", "B", "O"][i % 4].into(),
            (i % 30).to_string(),
            "Group".into(),
            "M".into(),
            format!("{}PC", i % 40),
            "Charge".into(),
            "MISDEMEANOR COMPLAINT FILED".into(),
            format!("{} MAIN ST", i % 200),
            String::new(),
            "34.05".into(),
            "-118.24".into(),
            String::new(),
            "2019-02-09".into(),
            "1830".into(),
            "BOOKINGS".into(),
            "4212".into(),
        ]);
    }
    Dataset::from_table(DatasetShape::Arrest, "bench", table).unwrap()
}

fn bench_ingest(c: &mut Criterion) {
    let dataset = arrest_dataset(5_000);
    c.bench_function("ingest_arrests_5k", |bench| {
        bench.iter(|| {
            let mut graph = IncidentGraph::new();
            black_box(ingest::ingest(&dataset, &mut graph, MalformedPolicy::Skip).unwrap())
        })
    });
}

fn bench_resolve_hit(c: &mut Criterion) {
    let mut graph = IncidentGraph::new();
    ingest::ingest(&arrest_dataset(5_000), &mut graph, MalformedPolicy::Skip).unwrap();
    let defining = [
        (Property::Age, Value::Integer(30)),
        (Property::Sex, Value::from("M")),
        (Property::Descent, Value::from("B")),
    ];

    c.bench_function("resolve_existing_person", |bench| {
        bench.iter(|| black_box(graph.resolve(EntityClass::Person, &defining).unwrap()))
    });
}

criterion_group!(benches, bench_ingest, bench_resolve_hit);
criterion_main!(benches);
