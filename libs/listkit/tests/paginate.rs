use chrono::{DateTime, Duration, TimeZone, Utc};
use listkit::{
    FieldAccess, FieldValue, FilterPredicate, InMemoryRepository, LinkConfig, Listable,
    Paginated, PaginationRequest, Paginator, QueryOverride,
};

#[derive(Clone, Debug)]
struct Post {
    id: i64,
    title: String,
    author_id: i64,
    published: bool,
    created_at: DateTime<Utc>,
}

impl Listable for Post {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl FieldAccess for Post {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::I64(self.id)),
            "title" => Some(FieldValue::Text(self.title.clone())),
            "authorId" => Some(FieldValue::I64(self.author_id)),
            "published" => Some(FieldValue::Bool(self.published)),
            _ => None,
        }
    }
}

fn posts(n: i64) -> InMemoryRepository<Post> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    InMemoryRepository::new(
        (1..=n)
            .map(|id| Post {
                id,
                title: if id % 2 == 0 {
                    format!("Hello world {id}")
                } else {
                    format!("Other {id}")
                },
                author_id: id % 3,
                published: id % 2 == 1,
                created_at: base + Duration::minutes(id),
            })
            .collect(),
    )
}

fn paginator() -> Paginator {
    Paginator::new(LinkConfig::new("http", "localhost:8087"))
}

fn request(pairs: &[(&str, &str)]) -> PaginationRequest {
    PaginationRequest::from_pairs(pairs.iter().copied()).unwrap()
}

fn follow(next: &str) -> PaginationRequest {
    let url = url::Url::parse(next).unwrap();
    PaginationRequest::from_pairs(url.query_pairs().into_owned()).unwrap()
}

async fn list(
    repo: &InMemoryRepository<Post>,
    req: &PaginationRequest,
) -> Paginated<Post, i64> {
    paginator()
        .paginate(req, repo, &QueryOverride::default(), "posts")
        .await
        .unwrap()
}

fn ids(page: &Paginated<Post, i64>) -> Vec<i64> {
    page.data().iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn cursor_walk_over_three_rows() {
    let repo = posts(3);

    let first = list(&repo, &request(&[("take", "2")])).await;
    assert_eq!(ids(&first), vec![1, 2]);
    let next = first.next().unwrap().to_string();
    assert_eq!(next, "http://localhost:8087/posts?take=2&where__id__more_than=2");
    let cursor = first.into_cursor().unwrap();
    assert_eq!(cursor.cursor.after, Some(2));
    assert_eq!(cursor.count, 2);

    let second = list(&repo, &follow(&next)).await;
    assert_eq!(ids(&second), vec![3]);
    let cursor = second.into_cursor().unwrap();
    assert_eq!(cursor.cursor.after, None);
    assert_eq!(cursor.next, None);
}

#[tokio::test]
async fn following_next_visits_each_row_once() {
    for (n, k) in [(10, 3), (9, 3), (1, 1), (0, 4), (7, 10), (20, 20)] {
        let repo = posts(n);
        assert_eq!(repo.len(), usize::try_from(n).unwrap());
        assert_eq!(repo.is_empty(), n == 0);
        let mut req = request(&[("take", &k.to_string())]);
        let mut seen = Vec::new();
        let mut requests = 0;

        loop {
            requests += 1;
            let page = list(&repo, &req).await;
            seen.extend(ids(&page));
            match page.next() {
                Some(next) => req = follow(next),
                None => break,
            }
            assert!(requests <= n + 1, "n={n} k={k} did not terminate");
        }

        let expected: Vec<i64> = (1..=n).collect();
        assert_eq!(seen, expected, "n={n} k={k}");
        let pages = (n + k - 1) / k;
        assert!(
            requests == pages || requests == pages + 1,
            "n={n} k={k}: {requests} requests"
        );
    }
}

#[tokio::test]
async fn full_page_always_links_forward() {
    let full = list(&posts(5), &request(&[("take", "5")])).await;
    assert_eq!(full.data().len(), 5);
    assert!(full.next().is_some());

    let partial = list(&posts(3), &request(&[("take", "5")])).await;
    assert_eq!(partial.data().len(), 3);
    assert_eq!(partial.next(), None);
}

#[tokio::test]
async fn descending_cursor_uses_less_than() {
    let repo = posts(5);
    let first = list(&repo, &request(&[("take", "2"), ("order__createdAt", "DESC")])).await;
    assert_eq!(ids(&first), vec![5, 4]);
    let next = first.next().unwrap();
    assert!(next.ends_with("where__id__less_than=4"));
    assert!(!next.contains("more_than"));

    let second = list(&repo, &follow(next)).await;
    assert_eq!(ids(&second), vec![3, 2]);
    let third = list(&repo, &follow(second.next().unwrap())).await;
    assert_eq!(ids(&third), vec![1]);
    assert_eq!(third.next(), None);
}

#[tokio::test]
async fn offset_page_reports_total() {
    let page = list(&posts(5), &request(&[("page", "2"), ("take", "2")])).await;
    assert_eq!(page.next(), None);
    let page = page.into_page().unwrap();
    assert_eq!(page.data.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn filters_apply_in_both_modes() {
    let repo = posts(10);

    let page = list(
        &repo,
        &request(&[("page", "1"), ("where__title__i_like", "HELLO")]),
    )
    .await
    .into_page()
    .unwrap();
    assert_eq!(page.total, 5);
    assert!(page.data.iter().all(|p| p.id % 2 == 0));

    let between = list(&repo, &request(&[("where__id__between", "2,4")])).await;
    assert_eq!(ids(&between), vec![2, 3, 4]);

    let within = list(&repo, &request(&[("where__id__in", "7,1,9")])).await;
    assert_eq!(ids(&within), vec![1, 7, 9]);

    let published = list(&repo, &request(&[("where__published", "true"), ("take", "2")])).await;
    assert_eq!(ids(&published), vec![1, 3]);
    let next = published.next().unwrap();
    assert!(next.contains("where__published=true"));
}

#[tokio::test]
async fn pinned_predicates_override_the_request() {
    let repo = posts(9);
    let overrides = QueryOverride::new().pin(FilterPredicate::eq("authorId", "1"));
    let page = paginator()
        .paginate(
            &request(&[("where__authorId", "2")]),
            &repo,
            &overrides,
            "posts",
        )
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1, 4, 7]);
}

#[tokio::test]
async fn adapter_errors_surface_as_client_errors() {
    let repo = posts(3);

    let err = paginator()
        .paginate(
            &request(&[("where__nope", "1")]),
            &repo,
            &QueryOverride::default(),
            "posts",
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.client_error(),
        Some(&listing_core::Error::UnknownField("nope".to_string()))
    );

    let err = paginator()
        .paginate(
            &request(&[("where__id__more_than", "abc")]),
            &repo,
            &QueryOverride::default(),
            "posts",
        )
        .await
        .unwrap_err();
    assert_eq!(err.client_error().map(|e| e.code()), Some("TYPE_MISMATCH"));
}
