use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use profile_query::config::ServiceConfig;
use profile_query::lexer::tokenize;
use profile_query::links::PageLinks;
use profile_query::page::{PageRequest, PageResult};
use profile_query::parser::Parser;
use profile_query::sql_compiler::SqlCompiler;
use profile_query::translator::{translate, FieldMapping};
use url::Url;

const TEST_CASES: [(&str, &str); 4] = [
    ("simple", "active==true"),
    ("medium", "active==true and age>=21 and mail=like=\"*@gso.org\""),
    (
        "complex",
        "(firstName==Ada or lastName==\"Love lace\") and birthDate>1990-01-01 and address.city=in=(Paris,Lyon,Lille)",
    ),
    (
        "or_optimization",
        "address.city==Paris or address.city==Lyon or address.city==Lille or address.city==Nice or address.city==Metz",
    ),
];

fn profile_fields() -> FieldMapping {
    ServiceConfig::default()
        .entity("profile")
        .map(|e| e.fields.clone())
        .expect("默认配置包含 profile 实体")
}

// 基准测试：词法分析性能
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for (name, query) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &query, |b, &query| {
            b.iter(|| black_box(tokenize(black_box(query)).expect("词法分析应该成功")))
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, query) in TEST_CASES {
        // 预先词法分析
        let tokens = tokenize(query).expect("词法分析应该成功");

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| black_box(Parser::new(black_box(tokens)).parse().expect("解析应该成功")))
        });
    }

    group.finish();
}

// 基准测试：字段转换与SQL编译性能
fn benchmark_translate_and_compile(c: &mut Criterion) {
    let fields = profile_fields();
    let compiler = SqlCompiler::new("profiles");
    let page = PageRequest::new(3, 20);

    let mut group = c.benchmark_group("translate_compile_performance");

    for (name, query) in TEST_CASES {
        let tokens = tokenize(query).expect("词法分析应该成功");
        let ast = Parser::new(&tokens).parse().expect("解析应该成功");

        group.bench_with_input(BenchmarkId::new("translate", name), &ast, |b, ast| {
            b.iter(|| black_box(translate(black_box(ast), &fields).expect("转换应该成功")))
        });

        let filter = translate(&ast, &fields).expect("转换应该成功");
        group.bench_with_input(BenchmarkId::new("compile", name), &filter, |b, filter| {
            b.iter(|| black_box(compiler.compile(black_box(filter), page)))
        });
    }

    group.finish();
}

// 基准测试：完整的端到端处理
fn benchmark_end_to_end(c: &mut Criterion) {
    let fields = profile_fields();
    let compiler = SqlCompiler::new("profiles");

    let mut group = c.benchmark_group("end_to_end_performance");

    for (name, query) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("full_pipeline", name), &query, |b, &query| {
            b.iter(|| {
                let filter = profile_query::compile_filter(Some(black_box(query)), &fields)
                    .expect("编译应该成功");
                black_box(compiler.compile(&filter, PageRequest::new(0, 20)))
            })
        });
    }

    group.finish();
}

// 基准测试：分页链接生成
fn benchmark_page_links(c: &mut Criterion) {
    let base = Url::parse("http://localhost:8080/api/v1/profiles").expect("合法的URL");
    let page = PageResult::new((40..60).collect::<Vec<u64>>(), 95, PageRequest::new(2, 20));

    c.bench_function("page_links", |b| {
        b.iter(|| black_box(PageLinks::build(black_box(&page), &base)))
    });
}

criterion_group!(
    benches,
    benchmark_lexer,
    benchmark_parser,
    benchmark_translate_and_compile,
    benchmark_end_to_end,
    benchmark_page_links
);
criterion_main!(benches);
