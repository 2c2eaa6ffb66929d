//! Independent provenance queries over one frozen evaluation

use std::thread;

use whyprov_engine::TreeBuilder;
use whyprov_foundation::Tuple;
use whyprov_runtime::Session;

#[test]
fn queries_share_the_results_across_threads() {
    let mut session = Session::new();
    session
        .load_program(
            "
            define(e,{int, int}); define(tc,{int, int});
            e(1,2); e(2,3); e(3,4); e(4,1);
            tc(X,Y) :- e(X,Y);
            tc(X,Z) :- tc(X,Y), e(Y,Z);
            ",
        )
        .unwrap();
    session.run().unwrap();

    let results = session.results().unwrap();
    let builder = TreeBuilder::new(results, session.rules());
    let tuples: Vec<Tuple> = results.tuples("tc").cloned().collect();
    assert_eq!(tuples.len(), 16);

    let sequential: Vec<_> = tuples
        .iter()
        .map(|t| builder.explain("tc", t).unwrap())
        .collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = tuples
            .iter()
            .map(|t| scope.spawn(move || builder.explain("tc", t).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}
