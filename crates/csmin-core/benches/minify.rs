//! Pipeline benchmarks: lexing, parsing, and the full minify path.

use criterion::{Criterion, criterion_group, criterion_main};
use csmin_core::{Minifier, MinifierOptions, lex_with_trivia, parse};
use std::hint::black_box;

const SAMPLE: &str = r#"
using System;

namespace Benchmarks
{
    internal class Accumulator
    {
        #region State
        private int total;
        private int count;
        #endregion

        // Running mean of everything fed in so far.
        internal double Mean
        {
            get { return count == 0 ? 0.0 : (double)total / count; }
        }

        internal void Feed(int value)
        {
            /* negative values are clamped */
            if (value < 0)
            {
                value = 0;
            }
            total = total + value;
            count = count + 1;
        }
    }
}
"#;

fn bench_lex(c: &mut Criterion) {
    c.bench_function("lex_with_trivia", |b| {
        b.iter(|| lex_with_trivia(black_box(SAMPLE)))
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| parse(black_box(SAMPLE))));
}

fn bench_minify(c: &mut Criterion) {
    let minifier = Minifier::new(MinifierOptions::default());
    c.bench_function("minify_full", |b| {
        b.iter(|| minifier.minify(black_box(SAMPLE)).unwrap())
    });
}

criterion_group!(benches, bench_lex, bench_parse, bench_minify);
criterion_main!(benches);
