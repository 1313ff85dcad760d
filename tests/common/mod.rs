#![allow(dead_code)]

use flowdag::config::PipelineConfig;
use flowdag::dag::TaskId;
use flowdag::engine::Pipeline;

/// A() -> "Hello"; B(a) -> a + ", World!"; A -> B.
pub fn hello_world(config: PipelineConfig) -> (Pipeline<String>, TaskId, TaskId) {
    let mut pipeline: Pipeline<String> = Pipeline::with_config(config);
    let a = pipeline.create_named_task("A", |_| Ok("Hello".to_string()));
    let b = pipeline.create_named_task("B", |inputs: Vec<String>| Ok(format!("{}, World!", inputs[0])));
    pipeline.set_dependency(a, b).unwrap();
    (pipeline, a, b)
}

/// A() = 1, B() = 10, C() = 100, D(a, b, c) = a + b + c.
pub fn fan_in_sum(config: PipelineConfig) -> (Pipeline<i64>, TaskId) {
    let mut pipeline: Pipeline<i64> = Pipeline::with_config(config);
    let a = pipeline.create_named_task("A", |_| Ok(1));
    let b = pipeline.create_named_task("B", |_| Ok(10));
    let c = pipeline.create_named_task("C", |_| Ok(100));
    let d = pipeline.create_named_task("D", |inputs: Vec<i64>| match inputs.as_slice() {
        [a, b, c] => Ok(a + b + c),
        other => anyhow::bail!("expected 3 inputs, got {}", other.len()),
    });
    for producer in [a, b, c] {
        pipeline.set_dependency(producer, d).unwrap();
    }
    (pipeline, d)
}

/// A() = 1; B(x) = x + 10; C(x) = x + 100; D(b, c) = b + c.
pub fn diamond(config: PipelineConfig) -> (Pipeline<i64>, [TaskId; 4]) {
    let mut pipeline: Pipeline<i64> = Pipeline::with_config(config);
    let a = pipeline.create_named_task("A", |_| Ok(1));
    let b = pipeline.create_named_task("B", |inputs: Vec<i64>| Ok(inputs[0] + 10));
    let c = pipeline.create_named_task("C", |inputs: Vec<i64>| Ok(inputs[0] + 100));
    let d = pipeline.create_named_task("D", |inputs: Vec<i64>| Ok(inputs[0] + inputs[1]));
    pipeline.set_dependency(a, b).unwrap();
    pipeline.set_dependency(a, c).unwrap();
    pipeline.set_dependency(b, d).unwrap();
    pipeline.set_dependency(c, d).unwrap();
    (pipeline, [a, b, c, d])
}
