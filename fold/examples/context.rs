use fibre_fold::{Context, Extensions};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::thread;

// The request state every context carries.
struct Incoming {
  query: String,
}

static PARSES: AtomicUsize = AtomicUsize::new(0);

fn main() -> fibre_fold::Result<()> {
  let extensions = Arc::new(Extensions::<Incoming>::new());

  // Contributed by one collaborator: parsed once per request.
  extensions.define(
    "params",
    |ctx: &Context<Incoming>| {
      PARSES.fetch_add(1, Ordering::SeqCst);
      Ok(
        ctx
          .query
          .split('&')
          .filter_map(|pair| pair.split_once('='))
          .map(|(k, v)| (k.to_owned(), v.to_owned()))
          .collect::<Vec<_>>(),
      )
    },
    true,
  );

  // Contributed by another: recomputed on every access.
  extensions.define(
    "param_count",
    |ctx: &Context<Incoming>| Ok(ctx.get_as::<Vec<(String, String)>>("params")?.len()),
    false,
  );

  let ctx = extensions.context(Incoming {
    query: "page=2&sort=name".into(),
  });

  // Several workers touch the same request's lazy property.
  thread::scope(|s| {
    for worker in 0..4 {
      let ctx = &ctx;
      s.spawn(move || {
        let count = ctx.get_as::<usize>("param_count").unwrap();
        println!("worker {} sees {} params", worker, count);
      });
    }
  });

  println!("params were parsed {} time(s)", PARSES.load(Ordering::SeqCst));
  assert_eq!(PARSES.load(Ordering::SeqCst), 1);
  Ok(())
}
