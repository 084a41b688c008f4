use serde::Serialize;

use crate::models::Module;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLink {
    pub course_id: String,
    pub module_id: String,
    pub sub_module_id: String,
    pub title: String,
    pub path: String,
}

pub fn lesson_path(course_id: &str, module_id: &str, sub_module_id: &str) -> String {
    format!("/course/{}/modules/{}/{}", course_id, module_id, sub_module_id)
}

/// Every lesson of the course, modules by `order` then lessons by `order`.
pub fn flatten_lessons(course_id: &str, modules: &[Module]) -> Vec<LessonLink> {
    let mut sorted: Vec<&Module> = modules.iter().collect();
    sorted.sort_by_key(|m| m.order);

    sorted
        .into_iter()
        .flat_map(|module| {
            module.sorted_sub_modules().into_iter().map(move |sub| LessonLink {
                course_id: course_id.to_string(),
                module_id: module.id.clone(),
                sub_module_id: sub.id.clone(),
                title: sub.title.clone(),
                path: lesson_path(course_id, &module.id, &sub.id),
            })
        })
        .collect()
}

/// The lesson after `(module_id, sub_module_id)`, crossing module boundaries.
pub fn next_lesson(
    course_id: &str,
    modules: &[Module],
    module_id: &str,
    sub_module_id: &str,
) -> Option<LessonLink> {
    let lessons = flatten_lessons(course_id, modules);
    let current = lessons
        .iter()
        .position(|l| l.module_id == module_id && l.sub_module_id == sub_module_id)?;
    lessons.into_iter().nth(current + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubModule;

    fn course() -> Vec<Module> {
        let mut second = Module::new("java", "oop", "OOP", 2);
        second.sub_modules.push(SubModule::new("classes", "Classes", 1));

        let mut first = Module::new("java", "basics", "Basics", 1);
        first.sub_modules.push(SubModule::new("loops", "Loops", 5));
        first.sub_modules.push(SubModule::new("hello", "Hello", 1));

        vec![second, first]
    }

    #[test]
    fn flattens_in_order() {
        let ids: Vec<String> = flatten_lessons("java", &course())
            .into_iter()
            .map(|l| l.sub_module_id)
            .collect();
        assert_eq!(ids, vec!["hello", "loops", "classes"]);
    }

    #[test]
    fn next_crosses_module_boundary() {
        let next = next_lesson("java", &course(), "basics", "loops").unwrap();
        assert_eq!(next.path, "/course/java/modules/oop/classes");
    }

    #[test]
    fn last_lesson_has_no_next() {
        assert_eq!(next_lesson("java", &course(), "oop", "classes"), None);
        assert_eq!(next_lesson("java", &course(), "nope", "nope"), None);
    }
}
