use cartdesk::models::CreateCartRequest;
use cartdesk::views::user::UserBorrowForm;
use cartdesk::{CartAdminView, CartApi, InMemoryBackend, ReturnPoints, SharedApi, UserBorrowView};
use cartdesk::forms::BorrowForm;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Helper: backend with `count` carts, every third one borrowed ---
fn seeded_backend(rt: &Runtime, count: usize) -> SharedApi {
  let backend = Arc::new(InMemoryBackend::new());
  rt.block_on(async {
    for i in 0..count {
      let cart = backend
        .create_cart(&CreateCartRequest { code: format!("CART-{:04}", i), return_point: Some("东门".into()) })
        .await
        .unwrap();
      if i % 3 == 0 {
        let borrow = BorrowForm {
          borrower_name: format!("user{}", i),
          borrower_phone: "13800000000".into(),
          borrower_destination: "图书馆".into(),
        };
        backend.borrow_cart(cart.id, &borrow.validate().unwrap()).await.unwrap();
      }
    }
  });
  backend
}

// --- Benchmark Functions ---

fn bench_admin_rows(c: &mut Criterion) {
  let mut group = c.benchmark_group("AdminRows");
  let rt = Runtime::new().unwrap();

  for fleet_size in [10usize, 100, 1_000].iter() {
    let api = seeded_backend(&rt, *fleet_size);
    let view = rt.block_on(CartAdminView::mount(api, ReturnPoints::default()));

    group.throughput(Throughput::Elements(*fleet_size as u64));
    group.bench_with_input(BenchmarkId::new("rows", fleet_size), fleet_size, |b, _| {
      b.iter(|| view.rows())
    });
    group.bench_with_input(BenchmarkId::new("page_1", fleet_size), fleet_size, |b, _| {
      b.iter(|| view.page(1))
    });
  }
  group.finish();
}

fn bench_code_lookup_submit(c: &mut Criterion) {
  let mut group = c.benchmark_group("UserBorrowLookup");
  let rt = Runtime::new().unwrap();

  for fleet_size in [10usize, 1_000].iter() {
    let api = seeded_backend(&rt, *fleet_size);
    let view = rt.block_on(UserBorrowView::mount(api));
    // Last cart, already borrowed: exercises the full lookup plus a 409.
    let code = format!("CART-{:04}", fleet_size - 1 - ((fleet_size - 1) % 3));
    let form = UserBorrowForm {
      cart_code: code,
      borrower: BorrowForm {
        borrower_name: "bench".into(),
        borrower_phone: "13800000000".into(),
        borrower_destination: "西门".into(),
      },
    };

    group.bench_with_input(BenchmarkId::new("conflicting_submit", fleet_size), fleet_size, |b, _| {
      b.to_async(&rt).iter(|| {
        let view = view.clone();
        let form = form.clone();
        async move { view.submit(&form).await.unwrap_err() }
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_admin_rows, bench_code_lookup_submit);
criterion_main!(benches);
