//! Index consistency checks

use agraph_core::{AnnotationHandle, Graph};

fn occurrences(list: &[AnnotationHandle], handle: AnnotationHandle) -> usize {
    list.iter().filter(|h| **h == handle).count()
}

/// Check every index an annotation is registered in
///
/// Panics with the offending annotation on the first inconsistency.
pub fn assert_consistent(graph: &Graph) {
    for a in graph.annotations() {
        let handle = a.handle();
        let layer = a.data().layer();

        assert_eq!(
            graph.annotation_by_id(a.id()).map(|b| b.handle()),
            Some(handle),
            "id index for {}",
            a.id()
        );

        let def = graph.schema().get(layer).expect("layer exists");
        assert_eq!(
            occurrences(def.annotations(), handle),
            1,
            "layer extent for {}",
            a.id()
        );

        let siblings = a.siblings();
        assert_eq!(occurrences(siblings, handle), 1, "sibling list for {}", a.id());
        assert!(a.ordinal() >= 1, "ordinal for {}", a.id());
        assert_eq!(siblings[a.ordinal() - 1], handle, "ordinal for {}", a.id());

        match a.parent() {
            Some(p) => assert_eq!(Some(p.data().layer()), def.parent(), "parent layer of {}", a.id()),
            None => assert!(
                def.is_root() || def.parent() == Some(graph.schema().root_handle()),
                "graph-scope annotation {} on a deep layer",
                a.id()
            ),
        }

        if let Some(start) = a.start() {
            assert_eq!(
                occurrences(start.data().start_of(layer), handle),
                1,
                "start_of for {}",
                a.id()
            );
        }
        if let Some(end) = a.end() {
            assert_eq!(
                occurrences(end.data().end_of(layer), handle),
                1,
                "end_of for {}",
                a.id()
            );
        }

        if def.alignment().is_tag() {
            if let Some(p) = a.parent() {
                assert_eq!(a.start(), p.start(), "tag start of {}", a.id());
                assert_eq!(a.end(), p.end(), "tag end of {}", a.id());
            }
        }

        if let (Some(s), Some(e)) = (a.start_offset(), a.end_offset()) {
            assert!(s <= e, "interval of {}", a.id());
        }
    }

    // and the reverse direction: anchor sets only name annotations that point back
    for (anchor_handle, anchor) in graph.anchors().iter() {
        for h in anchor.starting() {
            let a = graph.annotation(h).expect("start_of names a live annotation");
            assert_eq!(a.data().start(), Some(anchor_handle));
        }
        for h in anchor.ending() {
            let a = graph.annotation(h).expect("end_of names a live annotation");
            assert_eq!(a.data().end(), Some(anchor_handle));
        }
    }
}
