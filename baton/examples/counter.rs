// A counter actor that reports to a printer actor.
//
// Run with `RUST_LOG=baton=trace cargo run --example counter` to watch the
// deliveries: increments drain on the main thread, and every print request
// is handed to the idle printer inline, on the counter's own stack.

use std::fmt::Display;
use std::sync::Arc;

use anyhow::Result;
use baton::{logging, Actor, ActorCell, ActorExt, Inbox, InboxConfig};

#[derive(Actor)]
struct Printer {
    inbox: Inbox,
}

impl Printer {
    fn new() -> Result<Arc<Self>> {
        Ok(Arc::new(Self { inbox: Inbox::with_config(InboxConfig::named("printer"))? }))
    }

    /// Prints `line` from inside the printer. `from` is the calling actor.
    fn println(&self, from: Option<&dyn Actor>, line: impl Display + Send + 'static) {
        self.act(from, move || println!("{}", line));
    }
}

#[derive(Actor)]
struct Counter {
    inbox: Inbox,
    count: ActorCell<u64>,
    printer: Arc<Printer>,
}

impl Counter {
    fn new(printer: Arc<Printer>) -> Result<Arc<Self>> {
        let inbox = Inbox::with_config(InboxConfig::named("counter"))?;
        let count = ActorCell::new(&inbox, 0);
        Ok(Arc::new(Self { inbox, count, printer }))
    }

    /// Asks the counter to increment, from non-actor code.
    fn increment(self: &Arc<Self>) {
        let me = self.clone();
        self.act_external(move || me.count.with(|n| *n += 1));
    }

    /// Asks the counter to tell the printer its current count.
    fn print(self: &Arc<Self>) {
        let me = self.clone();
        self.act(Some(&**self), move || {
            let count = me.count.with(|n| *n);
            me.printer.println(Some(&*me), format!("The count is: {}", count));
        });
    }

    /// Reads the count from outside the actor system.
    fn get(self: &Arc<Self>) -> Result<u64> {
        let me = self.clone();
        Ok(baton::block(&**self, move || me.count.with(|n| *n))?)
    }
}

fn main() -> Result<()> {
    logging::init(logging::LogConfig::default());

    let printer = Printer::new()?;
    let counter = Counter::new(printer.clone())?;
    for _ in 0..10 {
        counter.increment();
        counter.print();
    }

    let n = counter.get()?;
    println!("Value from get: {}", n);

    // Wait for the printer to work through anything still queued.
    printer.sync_exec(|| ()).wait()?;
    println!("Exiting");
    Ok(())
}
