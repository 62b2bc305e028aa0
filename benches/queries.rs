use annotree::{DependencyEdge, Sentence, SentenceAnnotation, TokenRecord};
use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

/// A sentence of `n` clauses "w0 v0 w1 v1 ...", each verb governing its
/// subject and the next verb
fn sentence(n: usize) -> Sentence {
    let mut tokens = Vec::new();
    let mut dependencies = Vec::new();
    let mut parse = String::from("(ROOT");
    for i in 0..n {
        let subject = 2 * i + 1;
        let verb = subject + 1;
        tokens.push(TokenRecord::new(subject, "it", "it", "PRP"));
        tokens.push(TokenRecord::new(verb, "works", "work", "VBZ"));
        dependencies.push(DependencyEdge::new(verb, subject, "nsubj"));
        let governor = if i == 0 { 0 } else { verb - 2 };
        let relation = if i == 0 { "root" } else { "ccomp" };
        dependencies.push(DependencyEdge::new(governor, verb, relation));
        parse.push_str(" (S (NP (PRP it)) (VP (VBZ works)");
    }
    for _ in 0..n {
        parse.push_str("))");
    }
    parse.push(')');

    Sentence::new(
        1,
        SentenceAnnotation {
            tokens,
            dependencies,
            parse,
        },
    )
    .unwrap()
}

#[divan::bench(args = [16, 128])]
fn common_ancestor(bencher: Bencher, n: usize) {
    let sentence = sentence(n);
    let last = sentence.max_token_id();
    bencher.bench_local(|| black_box(sentence.common_ancestor(black_box(1), black_box(last))));
}

#[divan::bench(args = [16, 128])]
fn nearest_token_with_type(bencher: Bencher, n: usize) {
    let sentence = sentence(n);
    let last = sentence.max_token_id();
    bencher.bench_local(|| black_box(sentence.nearest_token_with_type(last, "subj", None)));
}

#[divan::bench(args = [16, 128])]
fn nearest_subject(bencher: Bencher, n: usize) {
    let sentence = sentence(n);
    let last = sentence.max_token_id();
    bencher.bench_local(|| black_box(sentence.nearest_subject(black_box(last))));
}

#[divan::bench(args = [16, 128])]
fn noun_phrases(bencher: Bencher, n: usize) {
    let sentence = sentence(n);
    bencher.bench_local(|| black_box(sentence.noun_phrases()));
}
