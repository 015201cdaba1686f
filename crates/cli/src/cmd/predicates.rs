use recval_core::predicates::PredicateRegistry;

pub fn run() {
    for name in PredicateRegistry::with_builtins().names() {
        println!("{name}");
    }
}
