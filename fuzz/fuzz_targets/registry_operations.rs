#![no_main]

use libfuzzer_sys::fuzz_target;
use injectable::{container, Scope};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Value(u8);

struct Held(u8);

// Replays a byte stream as registry operations and checks the model after each step
fuzz_target!(|data: &[u8]| {
    let c = container();
    c.reset();
    c.shared().reset();

    let mut expected: Option<u8> = None;
    let mut held: Vec<Arc<Held>> = Vec::new();

    for chunk in data.chunks(2) {
        let op = chunk[0] % 6;
        let arg = chunk.get(1).copied().unwrap_or(0);

        match op {
            0 => {
                c.register(move || Value(arg));
                expected = Some(arg);
            }
            1 => {
                c.reset();
                expected = None;
            }
            2 => {
                let resolved = c.resolve(|| Value(u8::MAX));
                assert_eq!(resolved, Value(expected.unwrap_or(u8::MAX)));
            }
            3 => {
                let obtained = c.shared().obtain(|| Arc::new(Held(arg)));
                if let Some(first) = held.first() {
                    assert!(Arc::ptr_eq(first, &obtained));
                }
                held.push(obtained);
            }
            4 => {
                held.clear();
                assert_eq!(c.shared().len(), 0);
            }
            _ => {
                if c.unregister::<Value>() {
                    expected = None;
                } else {
                    assert!(expected.is_none());
                }
            }
        }
    }

    c.reset();
});
