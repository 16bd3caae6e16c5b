#![allow(clippy::unwrap_used)]

//! End-to-end programs mixing async functions, emitters, timers and
//! workers, driven through the public embedding API.

use std::time::Duration;

use ember_eval::{buffer_handler, Interpreter, RuntimeError, Value};
use pretty_assertions::assert_eq;

fn run_to_completion(src: &str) -> (Result<Value, RuntimeError>, String) {
    let handler = buffer_handler();
    let interp = Interpreter::builder().print_handler(handler.clone()).build();
    let result = interp.run(&ember_parse::parse(src).unwrap());
    assert!(interp.wait_for_tasks(Some(Duration::from_secs(10))));
    (result, handler.get_output())
}

#[test]
fn producer_consumer_over_an_emitter() {
    let src = r#"
        let bus = new EventEmitter()
        let received = []
        bus.on("item", fn(x) { received.push(x) })
        bus.once("done", fn() { print("consumed " + received.join(",")) })

        async fn produce(n) {
            for (let i = 1; i <= n; i++) {
                bus.emit("item", i)
            }
            bus.emit("done")
            return n
        }
        await produce(3)
    "#;
    let (result, output) = run_to_completion(src);
    assert_eq!(result.unwrap(), Value::Number(3.0));
    assert_eq!(output, "consumed 1,2,3\n");
}

#[test]
fn worker_answers_host_messages() {
    let src = r#"
        let w = new Worker(fn(data, me) {
            me.onMessage(fn(n) { me.postMessage(n * n) })
        })
        let finished = new Promise(fn(resolve) {
            let results = []
            w.onMessage(fn(sq) {
                results.push(sq)
                if (len(results) == 3) {
                    w.terminate()
                    resolve(results)
                }
            })
        })
        for (let n of [2, 3, 4]) { w.postMessage(n) }
        print(await finished)
        await w.done()
        print(w.isRunning())
    "#;
    let (result, output) = run_to_completion(src);
    result.unwrap();
    assert_eq!(output, "[4, 9, 16]\nfalse\n");
}

#[test]
fn timers_resolve_promises() {
    let src = r#"
        fn after(ms, value) {
            return new Promise(fn(resolve) { setTimeout(resolve, ms, value) })
        }
        let order = []
        let slow = after(40, "slow").then(fn(v) { order.push(v) })
        let fast = after(5, "fast").then(fn(v) { order.push(v) })
        await Promise.all([slow, fast])
        print(order)
    "#;
    let (result, output) = run_to_completion(src);
    result.unwrap();
    assert_eq!(output, "[\"fast\", \"slow\"]\n");
}

#[test]
fn uncaught_error_in_async_code_surfaces_at_await() {
    let src = r#"
        async fn load(key) {
            let table = { a: 1 }
            if (table[key] == null) { throw TypeError("unknown key " + key) }
            return table[key]
        }
        await load("b")
    "#;
    let (result, _) = run_to_completion(src);
    let Err(RuntimeError::Uncaught(err)) = result else {
        panic!("expected uncaught exception");
    };
    assert_eq!(
        RuntimeError::Uncaught(err).to_string(),
        "uncaught exception: TypeError: unknown key b"
    );
}
