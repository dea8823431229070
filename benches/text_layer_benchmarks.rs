use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdf_text_layer::geometry::OrientedRect;
use pdf_text_layer::layout::{DuplicateLetterFilter, Letter};
use pdf_text_layer::TextLayerPipeline;

// Lines of "lorem ipsum" words, each glyph optionally painted twice
fn generate_page(line_count: usize, doubled: bool) -> Vec<Letter> {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur"];
    let mut letters = Vec::new();
    let mut sequence = 0;

    for line in 0..line_count {
        let baseline = 40.0 + line as f64 * 14.0;
        let mut x = 36.0;
        for word in words.iter().cycle().skip(line % words.len()).take(10) {
            for c in word.chars() {
                let bbox = OrientedRect::from_edges(x, baseline - 10.0, x + 6.0, baseline);
                letters.push(Letter::new(c.to_string(), bbox, 10.0, sequence));
                sequence += 1;
                if doubled {
                    let shadow =
                        OrientedRect::from_edges(x + 0.2, baseline - 9.8, x + 6.2, baseline + 0.2);
                    letters.push(Letter::new(c.to_string(), shadow, 10.0, sequence));
                    sequence += 1;
                }
                x += 6.0;
            }
            x += 6.0;
        }
    }

    letters
}

fn benchmark_duplicate_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate_filter");

    for lines in [10, 50, 200].iter() {
        let letters = generate_page(*lines, true);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_lines", lines)),
            &letters,
            |b, letters| {
                let filter = DuplicateLetterFilter::new();
                b.iter(|| filter.filter(black_box(letters.clone())));
            },
        );
    }

    group.finish();
}

fn benchmark_process_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_page");
    let pipeline = TextLayerPipeline::new();

    for lines in [10, 50].iter() {
        let letters = generate_page(*lines, false);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_lines", lines)),
            &letters,
            |b, letters| {
                b.iter(|| pipeline.process_page(1, black_box(letters.clone()), Vec::new()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_duplicate_filter, benchmark_process_page);
criterion_main!(benches);
