//! Async functions, promises, timers, event emitters and workers.

use std::time::Duration;

use pretty_assertions::assert_eq;

use super::{eval, eval_inspect, interpreter, output, run_in};
use crate::Value;

const DELAYED: &str = "async fn delayed(v, ms) { sleep(ms)\n return v }\n\
                       async fn failLater(v, ms) { sleep(ms)\n throw v }\n";

#[test]
fn async_call_returns_a_promise() {
    let src = "async fn double(x) { return x * 2 }\nlet p = double(21);\n[typeof(p), await p]";
    assert_eq!(eval_inspect(src), r#"["PROMISE", 42]"#);
}

#[test]
fn await_rethrows_rejections() {
    let src = "async fn fail() { throw \"nope\" }\n\
               let r = null\n\
               try { await fail() } catch (e) { r = e }\n\
               r";
    assert_eq!(eval(src), Value::from("nope"));
}

#[test]
fn engine_errors_in_async_bodies_reject_with_error_objects() {
    let src = "async fn broken() { return 1 / 0 }\n\
               let r = null\n\
               try { await broken() } catch (e) { r = e.name + \": \" + e.message }\n\
               r";
    assert_eq!(eval(src), Value::from("Error: division by zero"));
}

#[test]
fn await_passes_plain_values_through() {
    assert_eq!(eval("await 5"), Value::Number(5.0));
}

#[test]
fn async_closures_see_shared_state() {
    let src = "let counter = 0\n\
               async fn bump() { counter++ }\n\
               await bump()\n\
               await bump()\n\
               counter";
    assert_eq!(eval(src), Value::Number(2.0));
}

#[test]
fn promise_constructor_and_executor_throw() {
    assert_eq!(
        eval("await new Promise(fn(resolve, reject) { resolve(3) })"),
        Value::Number(3.0)
    );
    let src = "let p = new Promise(fn(resolve) { throw \"bad\" })\n\
               let r = null\n\
               try { await p } catch (e) { r = e }\n\
               r";
    assert_eq!(eval(src), Value::from("bad"));
}

#[test]
fn first_settlement_wins() {
    let src = "await new Promise(fn(resolve, reject) { resolve(1)\n reject(2)\n resolve(3) })";
    assert_eq!(eval(src), Value::Number(1.0));
}

#[test]
fn resolving_with_a_promise_adopts_it() {
    let src = "await new Promise(fn(resolve) { resolve(Promise.resolve(9)) })";
    assert_eq!(eval(src), Value::Number(9.0));
}

#[test]
fn then_chains() {
    let src = "await Promise.resolve(1)\n\
                 .then(fn(v) { return v + 1 })\n\
                 .then(fn(v) { return v * 10 })";
    assert_eq!(eval(src), Value::Number(20.0));
}

#[test]
fn rejection_skips_then_and_reaches_catch() {
    let src = "await Promise.reject(\"x\")\n\
                 .then(fn(v) { return \"unreachable\" })\n\
                 .catch(fn(e) { return \"handled \" + e })";
    assert_eq!(eval(src), Value::from("handled x"));
}

#[test]
fn finally_passes_the_outcome_through() {
    let src = "let p = Promise.resolve(\"kept\").finally(fn() { print(\"cleanup\") })\n\
               print(await p)";
    assert_eq!(output(src), "cleanup\nkept\n");
}

#[test]
fn promise_state_property() {
    let src = "let a = Promise.resolve(1)\n\
               let b = Promise.reject(2)\n\
               let c = new Promise(fn() {});\n\
               [a.state, b.state, c.state]";
    assert_eq!(eval_inspect(src), r#"["fulfilled", "rejected", "pending"]"#);
}

#[test]
fn promise_all_keeps_input_order() {
    let src = format!("{DELAYED}await Promise.all([delayed(\"slow\", 30), delayed(\"fast\", 1), 7])");
    assert_eq!(eval_inspect(&src), r#"["slow", "fast", 7]"#);
}

#[test]
fn promise_all_rejects_with_first_rejection_by_index() {
    let src = format!(
        "{DELAYED}let r = null\n\
         try {{ await Promise.all([failLater(\"a\", 20), Promise.reject(\"b\")]) }} catch (e) {{ r = e }}\n\
         r"
    );
    assert_eq!(eval(&src), Value::from("a"));
}

#[test]
fn promise_all_settled_reports_each_outcome() {
    let src = "await Promise.allSettled([Promise.resolve(1), Promise.reject(\"no\")])";
    assert_eq!(
        eval_inspect(src),
        r#"[{"status": "fulfilled", "value": 1}, {"reason": "no", "status": "rejected"}]"#
    );
}

#[test]
fn promise_race_takes_the_first_to_settle() {
    let src = format!("{DELAYED}await Promise.race([delayed(\"slow\", 200), delayed(\"fast\", 1)])");
    assert_eq!(eval(&src), Value::from("fast"));
}

#[test]
fn timeout_runs_after_the_main_body() {
    let src = "setTimeout(fn() { print(\"later\") }, 20)\nprint(\"now\")";
    assert_eq!(output(src), "now\nlater\n");
}

#[test]
fn timeout_forwards_extra_arguments() {
    assert_eq!(output("setTimeout(fn(a, b) { print(a + b) }, 1, 2, 3)"), "5\n");
}

#[test]
fn cleared_timeout_never_fires() {
    let src = "let t = setTimeout(fn() { print(\"never\") }, 100)\n\
               clearTimeout(t)\n\
               print(\"done\")";
    assert_eq!(output(src), "done\n");
}

#[test]
fn clear_accepts_numeric_ids() {
    let src = "let t = setTimeout(fn() { print(\"never\") }, 100)\n\
               clearTimeout(t.id)\n\
               clearTimeout(999)";
    assert_eq!(output(src), "");
}

#[test]
fn timer_ids_increase_from_one() {
    let src = "let a = setTimeout(fn() {}, 1)\nlet b = setInterval(fn() {}, 1)\nclearInterval(b);\n[a.id, b.id]";
    assert_eq!(eval_inspect(src), "[1, 2]");
}

#[test]
fn interval_repeats_until_cleared() {
    let src = "let n = 0\n\
               let id = null\n\
               id = setInterval(fn() {\n\
                 n++\n\
                 if (n == 3) { print(\"ticks \" + n) }\n\
                 if (n >= 3) { clearInterval(id) }\n\
               }, 2)";
    assert_eq!(output(src), "ticks 3\n");
}

#[test]
fn emitter_on_once_and_emit() {
    let src = "let e = new EventEmitter()\n\
               let log = []\n\
               e.on(\"data\", fn(x) { log.push(\"a\" + x) })\n\
               e.once(\"data\", fn(x) { log.push(\"b\" + x) })\n\
               e.emit(\"data\", 1)\n\
               e.emit(\"data\", 2)\n\
               let none = e.emit(\"nothing\");\n\
               [log, e.listenerCount(\"data\"), none]";
    assert_eq!(eval_inspect(src), r#"[["a1", "b1", "a2"], 1, false]"#);
}

#[test]
fn emitter_off_matches_callback_identity() {
    let src = "let e = new EventEmitter()\n\
               let log = []\n\
               let h = fn() { log.push(\"h\") }\n\
               e.on(\"x\", h)\n\
               e.on(\"x\", fn() { log.push(\"other\") })\n\
               e.off(\"x\", h)\n\
               e.emit(\"x\")\n\
               log";
    assert_eq!(eval_inspect(src), r#"["other"]"#);
}

#[test]
fn listeners_added_during_emit_wait_for_the_next_one() {
    let src = "let e = new EventEmitter()\n\
               let log = []\n\
               e.on(\"x\", fn() { log.push(\"first\")\n e.on(\"x\", fn() { log.push(\"late\") }) })\n\
               e.emit(\"x\")\n\
               e.emit(\"x\")\n\
               log";
    assert_eq!(eval_inspect(src), r#"["first", "first", "late"]"#);
}

#[test]
fn listener_can_remove_another_during_emit() {
    let src = "let e = new EventEmitter()\n\
               let log = []\n\
               let h = fn() { log.push(\"h\") }\n\
               e.on(\"x\", fn() { log.push(\"first\")\n e.off(\"x\", h) })\n\
               e.on(\"x\", h)\n\
               e.emit(\"x\")\n\
               e.emit(\"x\")\n\
               [log, e.listenerCount(\"x\")]";
    assert_eq!(eval_inspect(src), r#"[["first", "h", "first"], 1]"#);
}

#[test]
fn throwing_listener_propagates_to_emit_caller() {
    let src = "let e = new EventEmitter()\n\
               e.on(\"x\", fn() { throw \"listener failed\" })\n\
               let r = null\n\
               try { e.emit(\"x\") } catch (err) { r = err }\n\
               r";
    assert_eq!(eval(src), Value::from("listener failed"));
}

#[test]
fn emitter_names_and_remove_all() {
    let src = "let e = new EventEmitter()\n\
               e.on(\"b\", print).on(\"a\", print)\n\
               let before = e.eventNames()\n\
               e.removeAllListeners(\"a\")\n\
               let middle = e.eventNames()\n\
               e.removeAllListeners();\n\
               [before, middle, e.eventNames()]";
    assert_eq!(eval_inspect(src), r#"[["a", "b"], ["b"], []]"#);
}

#[test]
fn worker_body_sees_its_data() {
    let src = "let w = new Worker(fn(data) { print(\"got \" + data + \" \" + workerData) }, 5)\n\
               await w.done()";
    assert_eq!(output(src), "got 5 5\n");
}

#[test]
fn worker_drains_messages_until_terminated() {
    let src = "let w = new Worker(fn(data, me) {\n\
                 me.onMessage(fn(msg) {\n\
                   print(\"msg \" + msg)\n\
                   if (msg == \"stop\") { me.terminate() }\n\
                 })\n\
               })\n\
               w.postMessage(\"hi\")\n\
               w.postMessage(\"stop\")\n\
               await w.done()\n\
               print(w.isRunning(), w.postMessage(\"late\"))";
    assert_eq!(output(src), "msg hi\nmsg stop\nfalse false\n");
}

#[test]
fn worker_posts_results_to_the_host() {
    let src = "let w = new Worker(fn(data, me) {\n\
                 for (let n of data) { me.postMessage(n * n) }\n\
               }, [2, 3])\n\
               w.onMessage(fn(r) { print(\"squared \" + r) })";
    assert_eq!(output(src), "squared 4\nsquared 9\n");
}

#[test]
fn worker_messages_do_not_loop_back_to_the_sender() {
    let src = "let w = new Worker(fn(data, me) {\n\
                 me.onMessage(fn(m) { print(\"body got \" + m)\n me.terminate() })\n\
                 me.postMessage(\"from body\")\n\
               })\n\
               w.postMessage(\"from host\")\n\
               await w.done()";
    assert_eq!(output(src), "body got from host\n");
}

#[test]
fn worker_body_closes_over_its_defining_scope() {
    let src = "fn launch() {\n\
                 let secret = \"local\"\n\
                 return new Worker(fn() { print(secret) })\n\
               }\n\
               await launch().done()";
    assert_eq!(output(src), "local\n");
}

#[test]
fn worker_done_rejects_when_the_body_throws() {
    let src = "let w = new Worker(fn() { throw \"worker failed\" })\n\
               let r = null\n\
               try { await w.done() } catch (e) { r = e }\n\
               print(r)";
    assert_eq!(output(src), "worker failed\n");
}

#[test]
fn background_errors_are_collected() {
    let interp = interpreter();
    run_in(&interp, "setTimeout(fn() { throw \"oops\" }, 1)").unwrap();
    assert!(interp.wait_for_tasks(Some(Duration::from_secs(5))));
    assert_eq!(interp.background_errors(), vec![Value::from("oops")]);
}

#[test]
fn wait_for_tasks_times_out_and_cancels_timers() {
    let interp = interpreter();
    run_in(&interp, "setInterval(fn() {}, 5)").unwrap();
    assert!(!interp.wait_for_tasks(Some(Duration::from_millis(50))));
    assert!(interp.wait_for_tasks(Some(Duration::from_secs(5))));
}
