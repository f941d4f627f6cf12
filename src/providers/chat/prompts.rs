//! System prompts for the two-stage vision pipeline
//!
//! When no explicit question accompanies an image, the gateway first asks the
//! model to classify it, then re-prompts with a task prompt matched to the
//! category: UI screenshots become markup, text-heavy images go through OCR,
//! everything else gets described.

/// What the classifier decided an image is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    /// Screenshots of web pages, app screens, mockups, wireframes
    UiInterface,
    /// Scanned documents, receipts, signs, anything read for its text
    DocumentText,
    /// Photos, artwork, scenes, everything else
    GeneralImage,
}

impl ImageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::UiInterface => "ui_interface",
            ImageCategory::DocumentText => "document_text",
            ImageCategory::GeneralImage => "general_image",
        }
    }

    /// Map the classifier's raw output to a category.
    ///
    /// Anything unrecognized falls back to the general image description task.
    pub fn from_model_output(output: &str) -> Self {
        match output.trim().to_lowercase().as_str() {
            "ui_interface" => ImageCategory::UiInterface,
            "document_text" => ImageCategory::DocumentText,
            "general_image" => ImageCategory::GeneralImage,
            _ => ImageCategory::GeneralImage,
        }
    }

    /// System prompt for the task matching this category.
    pub fn task_prompt(&self) -> &'static str {
        match self {
            ImageCategory::UiInterface => UI_TO_CODE,
            ImageCategory::DocumentText => OCR,
            ImageCategory::GeneralImage => DESCRIBE_IMAGE,
        }
    }
}

/// Classifier system prompt. The model must answer with exactly one of the
/// three category tokens.
pub const CLASSIFY: &str = "\
You are an image classifier. Analyze the provided image and assign it to \
exactly one of the following categories. Your output must be the category \
token alone, with no additional text.

- `ui_interface`: web page screenshots, mobile app screens, software \
interfaces, design mockups or wireframes. Key signals: interactive elements \
(buttons, inputs, menus, navigation bars) and a clear layout intended for \
user operation.
- `document_text`: images whose main content is text meant to be read or \
extracted, such as scanned documents, book pages, letters, receipts, \
business cards, posters, signs or heavily labeled packaging.
- `general_image`: everything else, including landscapes, portraits, \
animals, still lifes, artwork, illustrations, abstract images and event \
scenes.

Answer with `ui_interface`, `document_text` or `general_image`.";

/// Task prompt for UI screenshots: reproduce the layout as HTML/CSS.
pub const UI_TO_CODE: &str = "\
You are an experienced front-end developer proficient in HTML, CSS and \
modern front-end practice. Analyze the provided UI image (web page \
screenshot, app screen or design mockup) and produce well-structured, \
semantic HTML and CSS that reproduce its visual layout and styling as \
precisely as possible.

Requirements:
1. Structure: identify the main layout regions (header, navigation, main \
content, sidebar, footer) and use semantic HTML5 elements with correct \
heading levels. Use `img` elements with descriptive `alt` text for images \
and icons.
2. Styling: extract the color scheme, typography (family, size, weight, \
line height) and layout technique (flexbox or grid); estimate dimensions \
and spacing; reproduce borders, radii and shadows with concise, \
maintainable CSS.
3. Content: copy the visible static text into the corresponding elements.
4. Output: a complete HTML code block followed by a complete CSS code \
block, both fenced in Markdown. No JavaScript and no explanatory prose \
outside the code blocks.";

/// Task prompt for text-heavy images: act as an OCR engine.
pub const OCR: &str = "\
You act as a high-accuracy optical character recognition engine. Extract \
all readable text from the provided image (document, receipt, book page, \
label, sign or similar).

Requirements:
1. Accuracy first: reproduce every character faithfully, including case, \
punctuation, special characters and digits.
2. Preserve formatting where possible: keep paragraph breaks, keep list \
markers, render clear table structures row by row with tab or `|` \
separators, and follow the original reading order.
3. Output the main language of the text as written; do not translate.
4. Ignore non-text elements unless they are part of the text flow.
5. Output the extracted plain text only, with no preamble such as \
\"Here is the extracted text:\".";

/// Task prompt for general images: produce a thorough description.
pub const DESCRIBE_IMAGE: &str = "\
You are a professional image analyst. Observe the provided image carefully \
and produce a detailed, objective description covering:

1. Subject and scene: the main subjects and the setting, time and \
atmosphere.
2. Composition: spatial arrangement, visual focus, and any composition \
principles at work.
3. Color and light: dominant palette, saturation and contrast; light \
source, direction and quality, and their effect on the mood.
4. Detail and texture: notable details and material qualities.
5. Action and emotion, when people or animals are present.
6. Style and medium, when identifiable (photo, illustration, painting, \
render; realistic, abstract, impressionist and so on).
7. Overall impression.

Use clear, precise, expressive language. Do not invent information the \
image does not show.";
