use criterion::{criterion_group, criterion_main, Criterion};
use yamltree::{deserialize, serialize};

/// A representative document: nested block mappings and sequences, flow
/// collections, quoted scalars, anchors and aliases.
fn large_document() -> String {
    let mut text = String::from("defaults: &defaults\n  retries: 3\n  timeout: 2.5\n");
    text.push_str("services:\n");
    for index in 0..500 {
        text.push_str(&format!(
            concat!(
                "- name: service-{index}\n",
                "  settings: *defaults\n",
                "  replicas: {replicas}\n",
                "  labels: {{tier: backend, zone: z{zone}}}\n",
                "  command: \"run --id={index}\\n\"\n",
                "  weights:\n",
                "  - 0.25\n",
                "  - 0.75\n"
            ),
            index = index,
            replicas = index % 7 + 1,
            zone = index % 3,
        ));
    }
    text
}

pub fn engine(c: &mut Criterion) {
    let input = large_document();

    c.bench_function("deserialize large", |b| {
        b.iter(|| deserialize(input.as_str()).unwrap())
    });

    let tree = deserialize(input.as_str()).unwrap();

    c.bench_function("serialize large", |b| b.iter(|| serialize(&tree).unwrap()));

    c.bench_function("round trip large", |b| {
        b.iter(|| {
            let tree = deserialize(input.as_str()).unwrap();
            serialize(&tree).unwrap()
        })
    });
}

criterion_group!(benches, engine);
criterion_main!(benches);
