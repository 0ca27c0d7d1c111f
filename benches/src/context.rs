use rand::Rng;

#[derive(serde::Serialize)]
pub struct Page {
    pub title: String,
    pub users: Vec<User>,
}

#[derive(serde::Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
}

pub fn random(n: usize) -> Page {
    let mut rng = rand::thread_rng();
    let title = (0..20).map(|_| rng.gen_range('a'..='z')).collect();
    let users = (0..n)
        .map(|_| User {
            name: (0..20).map(|_| rng.gen_range('a'..='z')).collect(),
            age: rng.gen_range(21..100),
        })
        .collect();
    Page { title, users }
}
