//! Builtin role-play scenario catalog.

use crate::Scenario;

/// The predefined scenarios, in display order. The first three feed the
/// home-screen carousel.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "school".to_string(),
            title: "孩子不想上学".to_string(),
            category: "校园生活".to_string(),
            icon: "school".to_string(),
            description: "练习当孩子说“讨厌学校”并且早晨拒绝出门时的应对方式。".to_string(),
            initial_message: "我今天不想去学校了，烦死了！".to_string(),
            image: "https://images.unsplash.com/photo-1503676260728-1c00da094a0b?q=80&w=800&auto=format&fit=crop".to_string(),
        },
        Scenario {
            id: "door".to_string(),
            title: "孩子关门不沟通".to_string(),
            category: "隐私与界限".to_string(),
            icon: "door_front".to_string(),
            description: "孩子在争吵后锁上房门拒绝交谈。你该如何重建联系？".to_string(),
            initial_message: "（门紧锁着，里面传来声音）你别管我！我不想和你说话！".to_string(),
            image: "https://images.unsplash.com/photo-1512632578888-169bbbc64f33?q=80&w=800&auto=format&fit=crop".to_string(),
        },
        Scenario {
            id: "phone".to_string(),
            title: "孩子玩手机很晚".to_string(),
            category: "屏幕时间".to_string(),
            icon: "smartphone".to_string(),
            description: "凌晨两点，你发现明天有考试的孩子还在玩手机。".to_string(),
            initial_message: "哎呀我知道了，打完这局就睡！你别烦我了！".to_string(),
            image: "https://images.unsplash.com/photo-1511556532299-8f662fc26c06?q=80&w=800&auto=format&fit=crop".to_string(),
        },
    ]
}

/// Resolve a live catalog scenario by id. Custom scenario ids are never in
/// the catalog, so re-opening those records resolves to `None`.
pub fn find(id: &str) -> Option<Scenario> {
    builtin_scenarios().into_iter().find(|s| s.id == id)
}
